use serde::{Deserialize, Serialize};

/// Provider address used when `BROKER_PROVIDER` is not set.
pub const DEFAULT_BROKER_PROVIDER: &str = "0xf07240Efa67755B5311bc75784a061eDB47165Dd";

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Base URL of the project/search backend
    pub api_url: String,
    /// Keyword expansion / summary LLM settings
    pub llm: LlmConfig,
    /// Inference broker settings (only used with the `broker` provider)
    pub broker: BrokerConfig,
    /// Maximum number of cached embeddings results (0 disables the cache)
    pub cache_max_size: usize,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "local", "ollama", "openai" or "broker"
    pub provider: String,
    /// Base URL for the LLM API (ignored by `local` and `broker`)
    pub base_url: String,
    /// Model name for chat completions
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Base URL of the broker sidecar
    pub url: String,
    /// Wallet key used to authenticate with the broker
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    /// Address of the inference provider to pay
    pub provider_address: String,
    /// Amount used when creating or topping up the ledger
    pub initial_fund_amount: f64,
    /// Balance under which a warning is logged
    pub min_ledger_balance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            api_url: "http://localhost:8000".to_string(),
            llm: LlmConfig::default(),
            broker: BrokerConfig::default(),
            cache_max_size: 100,
            request_timeout_secs: 60,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            api_key: None,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8787".to_string(),
            private_key: None,
            provider_address: DEFAULT_BROKER_PROVIDER.to_string(),
            initial_fund_amount: 0.05,
            min_ledger_balance: 0.01,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("GATEWAY_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(url) = lookup("API_URL").or_else(|| lookup("NEXT_PUBLIC_API_URL")) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.llm.provider = provider.trim().to_lowercase();
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }

        // Broker config
        if let Some(url) = lookup("BROKER_URL") {
            config.broker.url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("PRIVATE_KEY") {
            if !key.trim().is_empty() {
                config.broker.private_key = Some(key);
            }
        }
        if let Some(addr) = lookup("BROKER_PROVIDER") {
            config.broker.provider_address = addr;
        }
        if let Some(val) = lookup("INITIAL_FUND_AMOUNT") {
            if let Ok(v) = val.parse() {
                config.broker.initial_fund_amount = v;
            }
        }
        if let Some(val) = lookup("MIN_LEDGER_BALANCE") {
            if let Ok(v) = val.parse() {
                config.broker.min_ledger_balance = v;
            }
        }

        if let Some(val) = lookup("CACHE_MAX_SIZE") {
            if let Ok(v) = val.parse() {
                config.cache_max_size = v;
            }
        }
        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.request_timeout_secs = v.min(MAX_REQUEST_TIMEOUT_SECS);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.llm.provider, "local");
        assert_eq!(config.cache_max_size, 100);
        assert_eq!(config.broker.provider_address, DEFAULT_BROKER_PROVIDER);
        assert!(config.broker.private_key.is_none());
    }

    #[test]
    fn test_api_url_prefers_server_side_variable() {
        let config = config_from(&[
            ("API_URL", "http://internal:9000/"),
            ("NEXT_PUBLIC_API_URL", "https://public.example"),
        ]);
        assert_eq!(config.api_url, "http://internal:9000");
    }

    #[test]
    fn test_api_url_falls_back_to_public_variable() {
        let config = config_from(&[("NEXT_PUBLIC_API_URL", "https://public.example")]);
        assert_eq!(config.api_url, "https://public.example");
    }

    #[test]
    fn test_funding_amounts_parse() {
        let config = config_from(&[
            ("INITIAL_FUND_AMOUNT", "0.2"),
            ("MIN_LEDGER_BALANCE", "0.05"),
        ]);
        assert_eq!(config.broker.initial_fund_amount, 0.2);
        assert_eq!(config.broker.min_ledger_balance, 0.05);
    }

    #[test]
    fn test_unparsable_numbers_keep_defaults() {
        let config = config_from(&[
            ("INITIAL_FUND_AMOUNT", "lots"),
            ("CACHE_MAX_SIZE", "-3"),
        ]);
        assert_eq!(config.broker.initial_fund_amount, 0.05);
        assert_eq!(config.cache_max_size, 100);
    }

    #[test]
    fn test_timeout_is_capped() {
        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "9000")]);
        assert_eq!(config.request_timeout_secs, MAX_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_blank_private_key_is_ignored() {
        let config = config_from(&[("PRIVATE_KEY", "  ")]);
        assert!(config.broker.private_key.is_none());
    }

    #[test]
    fn test_provider_is_normalized() {
        let config = config_from(&[("LLM_PROVIDER", " Broker ")]);
        assert_eq!(config.llm.provider, "broker");
    }
}
