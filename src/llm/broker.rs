//! Paid inference through the compute-network broker.
//!
//! The broker owns the payment ledger and signs every request sent to a
//! provider. Setup (ledger funding, provider selection and acknowledgement,
//! endpoint lookup) happens once per process; each request then needs
//! fresh billing headers and a settlement call once the answer is in.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::config::BrokerConfig;
use crate::llm::completion::{call_openai, Completion, Message};

/// Balance under which setup tops up the ledger on its own.
const CRITICAL_LEDGER_BALANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LedgerInfo {
    pub balance: f64,
}

/// One entry of the network's service listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

/// Where a provider serves requests and which model it runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceMetadata {
    pub endpoint: String,
    pub model: String,
}

#[async_trait]
pub trait Broker: Send + Sync {
    async fn ledger(&self) -> Result<LedgerInfo>;
    async fn add_ledger(&self, amount: f64) -> Result<()>;
    async fn list_services(&self) -> Result<Vec<ServiceInfo>>;
    async fn acknowledge_provider(&self, provider: &str) -> Result<()>;
    async fn service_metadata(&self, provider: &str) -> Result<ServiceMetadata>;
    async fn request_headers(&self, provider: &str, content: &str)
        -> Result<HashMap<String, String>>;
    async fn process_response(
        &self,
        provider: &str,
        content: &str,
        chat_id: Option<&str>,
    ) -> Result<()>;
}

// ─── HTTP sidecar ────────────────────────────────────────

/// [`Broker`] backed by the broker sidecar's HTTP API.
pub struct HttpBroker {
    client: reqwest::Client,
    base_url: String,
    private_key: Option<String>,
}

#[derive(Serialize)]
struct AddLedgerRequest {
    amount: f64,
}

#[derive(Serialize)]
struct HeadersRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct HeadersResponse {
    headers: Map<String, Value>,
}

#[derive(Serialize)]
struct SettleRequest<'a> {
    content: &'a str,
    chat_id: Option<&'a str>,
}

impl HttpBroker {
    pub fn new(client: reqwest::Client, config: &BrokerConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            private_key: config.private_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let key = self
            .private_key
            .as_deref()
            .context("PRIVATE_KEY is missing")?;
        Ok(self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(key))
    }

    async fn send(builder: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let resp = builder
            .send()
            .await
            .with_context(|| format!("Failed to reach broker for {action}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Broker {action} returned {status}: {body}");
        }
        Ok(resp)
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn ledger(&self) -> Result<LedgerInfo> {
        let req = self.request(reqwest::Method::GET, "/ledger")?;
        let resp = Self::send(req, "ledger lookup").await?;
        resp.json().await.context("Failed to parse broker ledger")
    }

    async fn add_ledger(&self, amount: f64) -> Result<()> {
        let req = self
            .request(reqwest::Method::POST, "/ledger")?
            .json(&AddLedgerRequest { amount });
        Self::send(req, "ledger funding").await?;
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<ServiceInfo>> {
        let req = self.request(reqwest::Method::GET, "/services")?;
        let resp = Self::send(req, "service listing").await?;
        resp.json()
            .await
            .context("Failed to parse broker service listing")
    }

    async fn acknowledge_provider(&self, provider: &str) -> Result<()> {
        let req = self.request(
            reqwest::Method::POST,
            &format!("/providers/{provider}/acknowledge"),
        )?;
        Self::send(req, "provider acknowledgement").await?;
        Ok(())
    }

    async fn service_metadata(&self, provider: &str) -> Result<ServiceMetadata> {
        let req = self.request(
            reqwest::Method::GET,
            &format!("/providers/{provider}/metadata"),
        )?;
        let resp = Self::send(req, "service metadata").await?;
        resp.json()
            .await
            .context("Failed to parse broker service metadata")
    }

    async fn request_headers(
        &self,
        provider: &str,
        content: &str,
    ) -> Result<HashMap<String, String>> {
        let req = self
            .request(
                reqwest::Method::POST,
                &format!("/providers/{provider}/headers"),
            )?
            .json(&HeadersRequest { content });
        let resp = Self::send(req, "request headers").await?;
        let body: HeadersResponse = resp
            .json()
            .await
            .context("Failed to parse broker request headers")?;

        // Only string values are usable as HTTP headers
        Ok(body
            .headers
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect())
    }

    async fn process_response(
        &self,
        provider: &str,
        content: &str,
        chat_id: Option<&str>,
    ) -> Result<()> {
        let req = self
            .request(
                reqwest::Method::POST,
                &format!("/providers/{provider}/settle"),
            )?
            .json(&SettleRequest { content, chat_id });
        Self::send(req, "payment settlement").await?;
        Ok(())
    }
}

// ─── Session ─────────────────────────────────────────────

/// The provider chosen at setup with its endpoint and model.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveService {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
}

/// Process-wide broker state: the provider in use and its resolved endpoint.
pub struct BrokerSession {
    broker: Arc<dyn Broker>,
    config: BrokerConfig,
    active: OnceCell<ActiveService>,
}

impl BrokerSession {
    pub fn new(broker: Arc<dyn Broker>, config: BrokerConfig) -> Self {
        Self {
            broker,
            config,
            active: OnceCell::new(),
        }
    }

    /// Provider used when the network lists it.
    pub fn preferred_provider(&self) -> &str {
        &self.config.provider_address
    }

    pub fn is_initialized(&self) -> bool {
        self.active.initialized()
    }

    /// Provider, endpoint and model in use, running one-time setup on first
    /// use. Failed setups are not remembered.
    pub async fn service(&self) -> Result<ActiveService> {
        self.active
            .get_or_try_init(|| self.initialize())
            .await
            .cloned()
    }

    async fn initialize(&self) -> Result<ActiveService> {
        tracing::info!("Initializing inference broker");

        self.ensure_ledger().await;
        let provider = self.select_provider().await?;
        self.acknowledge(&provider).await;

        let metadata = self
            .broker
            .service_metadata(&provider)
            .await
            .context("Failed to fetch provider service metadata")?;
        tracing::info!(
            "Using provider {provider} with model {} at {}",
            metadata.model,
            metadata.endpoint
        );
        Ok(ActiveService {
            provider,
            endpoint: metadata.endpoint,
            model: metadata.model,
        })
    }

    async fn ensure_ledger(&self) {
        let funding = self.config.initial_fund_amount;

        match self.broker.ledger().await {
            Ok(ledger) => {
                tracing::info!("Current ledger balance: {} 0G", ledger.balance);
                if ledger.balance < self.config.min_ledger_balance {
                    tracing::warn!(
                        "Ledger balance ({:.4} 0G) is below minimum ({} 0G)",
                        ledger.balance,
                        self.config.min_ledger_balance
                    );
                    if ledger.balance < CRITICAL_LEDGER_BALANCE {
                        tracing::info!("Funding ledger with {funding} 0G");
                        if let Err(e) = self.broker.add_ledger(funding).await {
                            tracing::error!("Failed to fund ledger: {e:#}");
                        }
                    }
                }
            }
            Err(e) if format!("{e:#}").contains("Account already exists") => {}
            Err(e) => {
                tracing::info!("Ledger lookup failed ({e:#}), creating ledger");
                if let Err(e) = self.broker.add_ledger(funding).await {
                    tracing::error!("Failed to create/fund ledger: {e:#}");
                }
            }
        }
    }

    /// The preferred provider when it is listed, else the first listed one.
    async fn select_provider(&self) -> Result<String> {
        let services = self
            .broker
            .list_services()
            .await
            .context("Failed to list inference services")?;

        let preferred = self.preferred_provider();
        let selected = services
            .iter()
            .find(|s| s.provider == preferred)
            .or_else(|| services.first())
            .context("No inference services available")?;

        if selected.provider != preferred {
            tracing::warn!(
                "Preferred provider {preferred} is not listed, using {}",
                selected.provider
            );
        }
        Ok(selected.provider.clone())
    }

    async fn acknowledge(&self, provider: &str) {
        match self.broker.acknowledge_provider(provider).await {
            Ok(()) => tracing::info!("Provider {provider} acknowledged"),
            Err(e) if format!("{e:#}").contains("already acknowledged") => {}
            Err(e) => tracing::warn!("Provider acknowledgement warning: {e:#}"),
        }
    }

    /// Send a paid completion. `billing_content` is what the request headers
    /// are signed over. Settlement failures are logged, never returned.
    pub async fn complete(
        &self,
        client: &reqwest::Client,
        messages: Vec<Message>,
        billing_content: &str,
    ) -> Result<Completion> {
        let service = self.service().await?;

        let raw_headers = self
            .broker
            .request_headers(&service.provider, billing_content)
            .await
            .context("Failed to generate broker request headers")?;
        let headers = to_header_map(raw_headers);

        let url = format!("{}/chat/completions", service.endpoint.trim_end_matches('/'));
        let completion = call_openai(client, &url, &service.model, None, headers, messages).await?;

        if let Err(e) = self
            .broker
            .process_response(&service.provider, &completion.content, completion.id.as_deref())
            .await
        {
            tracing::error!("Payment processing failed: {e:#}");
        }

        Ok(completion)
    }
}

fn to_header_map(raw: HashMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (key, value) in raw {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid broker header '{key}'"),
        }
    }
    headers
}
