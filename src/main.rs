use tracing_subscriber::EnvFilter;

use showcase_gateway::api;
use showcase_gateway::config::Config;
use showcase_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Backend: {}", config.api_url);
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);
    if config.llm.provider == "broker" {
        tracing::info!(
            "Broker: {} (provider {})",
            config.broker.url,
            config.broker.provider_address
        );
        if config.broker.private_key.is_none() {
            tracing::warn!("PRIVATE_KEY is not set; paid expansion requests will fail");
        }
    }

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
