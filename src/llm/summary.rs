use anyhow::Result;

use crate::config::LlmConfig;
use crate::llm::broker::BrokerSession;
use crate::llm::completion::{self, Message};
use crate::models::Project;

pub const NO_RESULTS_MESSAGE: &str = "Hmm, couldn't find exactly what you're looking for. \
     Try tweaking your search or come at it from a different angle!";

pub const DEFAULT_SUMMARY: &str = "Found some cool projects for you!";

const SUMMARY_PROMPT: &str = "\
You are a hackathon mentor who has judged hundreds of web3 hackathons. You are high-energy, \
deeply familiar with the Ethereum ecosystem and always focused on shipping.

Goal: help the user find inspiration by presenting past hackathon projects that match their idea.

Instructions:
1. Read the user's idea or search term.
2. Use only the projects provided. Never list more than 10.
3. Be encouraging and concise. Speak like a hacker to a hacker, no corporate jargon.

Output format:
Start with a punchy one-line intro, then list each project as

**1. [Project Name]** - [One sentence pitch]
*Why it's cool:* [Your take on the tech or impact]

End with a short paragraph connecting the themes.";

/// Numbered `N. name - tagline` lines for the summary prompt.
pub fn build_project_context(projects: &[Project]) -> String {
    projects
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let name = p.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Untitled");
            let tagline = p
                .tagline
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("No description");
            format!("{}. {name} - {tagline}", idx + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_messages(query: &str, projects: &[Project]) -> Vec<Message> {
    let context = build_project_context(projects);
    vec![
        Message::system(SUMMARY_PROMPT),
        Message::user(format!(
            "User query: \"{query}\"\n\nProjects:\n{context}\n\n\
             List these projects with your energetic commentary."
        )),
    ]
}

/// Write the chat reply for `projects`.
///
/// Without projects this is a fixed line and no model is called. The
/// `local` provider has no model, so it answers with [`DEFAULT_SUMMARY`].
pub async fn summarize(
    client: &reqwest::Client,
    config: &LlmConfig,
    broker: &BrokerSession,
    query: &str,
    projects: &[Project],
) -> Result<String> {
    if projects.is_empty() {
        return Ok(NO_RESULTS_MESSAGE.to_string());
    }

    if config.provider == "local" {
        return Ok(DEFAULT_SUMMARY.to_string());
    }

    let messages = build_messages(query, projects);
    let completion = if config.provider == "broker" {
        broker.complete(client, messages, query).await?
    } else {
        completion::complete(client, config, messages).await?
    };

    if completion.content.is_empty() {
        Ok(DEFAULT_SUMMARY.to_string())
    } else {
        Ok(completion.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;
    use crate::llm::broker::HttpBroker;
    use std::sync::Arc;

    fn project(name: Option<&str>, tagline: Option<&str>) -> Project {
        Project {
            name: name.map(str::to_string),
            tagline: tagline.map(str::to_string),
            ..Default::default()
        }
    }

    fn session() -> BrokerSession {
        let config = BrokerConfig::default();
        let broker = HttpBroker::new(reqwest::Client::new(), &config);
        BrokerSession::new(Arc::new(broker), config)
    }

    #[test]
    fn test_context_numbers_projects() {
        let ctx = build_project_context(&[
            project(Some("Zapper"), Some("One-click DeFi")),
            project(Some("Vault"), Some("Social recovery wallet")),
        ]);
        assert_eq!(ctx, "1. Zapper - One-click DeFi\n2. Vault - Social recovery wallet");
    }

    #[test]
    fn test_context_defaults_for_missing_fields() {
        let ctx = build_project_context(&[project(None, Some(""))]);
        assert_eq!(ctx, "1. Untitled - No description");
    }

    #[test]
    fn test_messages_embed_query_and_context() {
        let msgs = build_messages("zk voting", &[project(Some("Ballot"), None)]);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert!(msgs[1].content.contains("\"zk voting\""));
        assert!(msgs[1].content.contains("1. Ballot - No description"));
    }

    #[tokio::test]
    async fn test_no_projects_skips_model() {
        let config = LlmConfig {
            provider: "openai".into(),
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let msg = summarize(&reqwest::Client::new(), &config, &session(), "q", &[])
            .await
            .unwrap();
        assert_eq!(msg, NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_local_provider_uses_default_summary() {
        let msg = summarize(
            &reqwest::Client::new(),
            &LlmConfig::default(),
            &session(),
            "q",
            &[project(Some("A"), None)],
        )
        .await
        .unwrap();
        assert_eq!(msg, DEFAULT_SUMMARY);
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error() {
        let config = LlmConfig {
            provider: "ollama".into(),
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let result = summarize(
            &reqwest::Client::new(),
            &config,
            &session(),
            "q",
            &[project(Some("A"), None)],
        )
        .await;
        assert!(result.is_err());
    }
}
