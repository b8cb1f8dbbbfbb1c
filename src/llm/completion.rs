use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// A single chat turn sent to a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A finished (non-streaming) completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Provider-assigned id, needed to settle paid requests
    pub id: Option<String>,
    pub content: String,
}

/// Run a completion against the directly configured provider.
/// The broker provider goes through [`crate::llm::broker::BrokerSession::complete`].
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<Message>,
) -> Result<Completion> {
    match config.provider.as_str() {
        "ollama" => call_ollama(client, config, messages).await,
        "openai" => {
            let url = format!("{}/v1/chat/completions", config.base_url);
            call_openai(
                client,
                &url,
                &config.chat_model,
                config.api_key.as_deref(),
                HeaderMap::new(),
                messages,
            )
            .await
        }
        other => anyhow::bail!("Provider '{other}' has no direct completion endpoint"),
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<Message>,
) -> Result<Completion> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages,
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp
        .json()
        .await
        .context("Failed to parse Ollama chat response")?;
    Ok(Completion {
        id: None,
        content: body.message.content.trim().to_string(),
    })
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    id: Option<String>,
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// POST an OpenAI-style chat completion to `url`. `headers` are added on top
/// of the bearer key, which is omitted when `api_key` is `None`.
pub async fn call_openai(
    client: &reqwest::Client,
    url: &str,
    model: &str,
    api_key: Option<&str>,
    headers: HeaderMap,
    messages: Vec<Message>,
) -> Result<Completion> {
    let req = OpenAiChatRequest { model, messages };

    let mut builder = client.post(url).headers(headers).json(&req);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }

    let resp = builder
        .send()
        .await
        .context("Failed to call OpenAI-compatible chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Chat completion API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    Ok(Completion {
        id: body.id,
        content: content.trim().to_string(),
    })
}
