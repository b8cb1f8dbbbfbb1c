use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::llm::broker::{Broker, BrokerSession, HttpBroker};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
    pub backend: BackendClient,
    pub cache: Arc<ResultCache>,
    pub broker: Arc<BrokerSession>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_http_client(&config)?;
        let broker = HttpBroker::new(http_client.clone(), &config.broker);
        Ok(Self::assemble(config, http_client, Arc::new(broker)))
    }

    /// Build state around a caller-supplied broker implementation.
    pub fn with_broker(config: Config, broker: Arc<dyn Broker>) -> anyhow::Result<Self> {
        let http_client = build_http_client(&config)?;
        Ok(Self::assemble(config, http_client, broker))
    }

    fn assemble(config: Config, http_client: reqwest::Client, broker: Arc<dyn Broker>) -> Self {
        let backend = BackendClient::new(http_client.clone(), config.api_url.clone());
        let cache = ResultCache::new(config.cache_max_size);
        let session = BrokerSession::new(broker, config.broker.clone());

        Self {
            config: Arc::new(config),
            http_client,
            backend,
            cache: Arc::new(cache),
            broker: Arc::new(session),
        }
    }

    /// True when the broker provider is selected but no wallet key is set.
    pub fn broker_key_missing(&self) -> bool {
        self.config.llm.provider == "broker" && self.config.broker.private_key.is_none()
    }
}

fn build_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_key_missing_only_for_broker_provider() {
        let state = AppState::new(Config::default()).unwrap();
        assert!(!state.broker_key_missing());

        let mut config = Config::default();
        config.llm.provider = "broker".into();
        let state = AppState::new(config.clone()).unwrap();
        assert!(state.broker_key_missing());

        config.broker.private_key = Some("0xkey".into());
        let state = AppState::new(config).unwrap();
        assert!(!state.broker_key_missing());
    }
}
