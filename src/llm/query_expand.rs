use anyhow::Result;

use crate::config::LlmConfig;
use crate::llm::broker::BrokerSession;
use crate::llm::completion::{self, Message};
use crate::llm::keywords::{local_keywords, parse_keyword_list};

const EXPANSION_PROMPT: &str = "\
You transform a natural language request into an expanded list of search keywords.
Your job is to:
- extract the core concepts
- expand them with synonyms, related categories, and domain-relevant terms
- include both specific and broad variants
- output 8-20 search tokens
- avoid stopwords and filler words
- return ONLY a comma-separated list of search keywords. No sentences.

For example, if the user asks \"Show me projects like Facebook\", you should output keywords like:
social media, messaging, social network, chat app, community platform, user profiles, feed, \
timeline, friends list, photo sharing, real-time updates";

/// Expand a user query into a comma-separated keyword string.
///
/// Uses the configured model when there is one. Provider errors and empty
/// answers fall back to [`local_keywords`], so this never fails.
pub async fn expand_query(
    client: &reqwest::Client,
    config: &LlmConfig,
    broker: &BrokerSession,
    query: &str,
) -> String {
    if config.provider == "local" {
        return local_keywords(query);
    }

    match expand_with_model(client, config, broker, query).await {
        Ok(keywords) if !keywords.is_empty() => {
            tracing::info!("Query expanded via {}: {:?}", config.provider, keywords);
            keywords.join(", ")
        }
        Ok(_) => {
            tracing::warn!("Query expansion returned no keywords, using local expansion");
            local_keywords(query)
        }
        Err(e) => {
            tracing::warn!("Query expansion failed: {e:#}");
            local_keywords(query)
        }
    }
}

async fn expand_with_model(
    client: &reqwest::Client,
    config: &LlmConfig,
    broker: &BrokerSession,
    query: &str,
) -> Result<Vec<String>> {
    let messages = vec![Message::system(EXPANSION_PROMPT), Message::user(query)];

    let completion = if config.provider == "broker" {
        broker.complete(client, messages, query).await?
    } else {
        completion::complete(client, config, messages).await?
    };

    Ok(parse_keyword_list(&completion.content))
}
