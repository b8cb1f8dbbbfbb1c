use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    ChatResponse, GraphBody, GraphData, Project, SearchBody, SearchResponse, TypesResponse,
};

/// Typed client for the project/search backend.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    keywords: &'a str,
}

#[derive(Serialize)]
struct ChatFallbackRequest<'a> {
    query: &'a str,
}

impl BackendClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST /search
    pub async fn search(&self, body: &SearchBody) -> Result<SearchResponse> {
        let resp = self
            .client
            .post(self.url("search"))
            .json(body)
            .send()
            .await
            .context("Failed to call backend search")?;
        read_json(resp, "search").await
    }

    /// GET /project?uuid=
    pub async fn project(&self, uuid: &str) -> Result<Project> {
        let resp = self
            .client
            .get(self.url("project"))
            .query(&[("uuid", uuid)])
            .send()
            .await
            .context("Failed to call backend project")?;
        read_json(resp, "project").await
    }

    /// GET /similar?uuid=
    pub async fn similar(&self, uuid: &str) -> Result<Vec<Project>> {
        let resp = self
            .client
            .get(self.url("similar"))
            .query(&[("uuid", uuid)])
            .send()
            .await
            .context("Failed to call backend similar")?;
        read_json(resp, "similar").await
    }

    /// GET /types
    pub async fn types(&self) -> Result<TypesResponse> {
        let resp = self
            .client
            .get(self.url("types"))
            .send()
            .await
            .context("Failed to call backend types")?;
        read_json(resp, "types").await
    }

    /// POST /graph?threshold=
    pub async fn graph(&self, body: &GraphBody, threshold: f64) -> Result<GraphData> {
        let resp = self
            .client
            .post(self.url("graph"))
            .query(&[("threshold", threshold)])
            .json(body)
            .send()
            .await
            .context("Failed to call backend graph")?;
        read_json(resp, "graph").await
    }

    /// POST /embeddings with the expanded keyword string.
    pub async fn embeddings(&self, keywords: &str) -> Result<Vec<Project>> {
        let resp = self
            .client
            .post(self.url("embeddings"))
            .json(&EmbeddingsRequest { keywords })
            .send()
            .await
            .context("Failed to fetch from backend embeddings")?;
        read_json(resp, "embeddings").await
    }

    /// POST /chat, the backend's own chat answer.
    pub async fn chat(&self, query: &str) -> Result<ChatResponse> {
        let resp = self
            .client
            .post(self.url("chat"))
            .json(&ChatFallbackRequest { query })
            .send()
            .await
            .context("Failed to call backend chat")?;
        read_json(resp, "chat").await
    }

    /// Forward an arbitrary request to `{base}/{path}`. The response is
    /// returned as-is, whatever its status.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<reqwest::Response> {
        let mut url = self.url(path);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }

        let mut req = self.client.request(method.clone(), &url).headers(headers);
        if !body.is_empty() {
            req = req.body(body);
        }

        req.send()
            .await
            .with_context(|| format!("Failed to forward {method} /{}", path.trim_start_matches('/')))
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, endpoint: &str) -> Result<T> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Backend {endpoint} returned {status}: {body}");
    }

    resp.json()
        .await
        .with_context(|| format!("Failed to parse backend {endpoint} response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = BackendClient::new(reqwest::Client::new(), "http://api.local/");
        assert_eq!(backend.base_url(), "http://api.local");
        assert_eq!(backend.url("/embeddings"), "http://api.local/embeddings");
        assert_eq!(backend.url("types"), "http://api.local/types");
    }
}
