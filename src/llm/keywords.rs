use std::collections::HashSet;

/// Maximum number of keywords forwarded to the embeddings search.
pub const MAX_KEYWORDS: usize = 20;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "or", "for", "to", "in", "on", "with", "like", "show", "me",
    "projects",
];

/// Expand a query into keywords without calling a model.
///
/// Lowercases, turns anything that is not `[a-z0-9]` or whitespace into a
/// separator, drops stopwords and duplicates, and keeps the first
/// [`MAX_KEYWORDS`] tokens. Falls back to the query itself when nothing
/// survives, so a non-empty query never yields an empty string.
pub fn local_keywords(query: &str) -> String {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(t))
        .filter(|t| seen.insert(*t))
        .take(MAX_KEYWORDS)
        .collect();

    if tokens.is_empty() {
        query.to_string()
    } else {
        tokens.join(", ")
    }
}

/// Normalize a model's keyword answer into a clean list.
///
/// Models are asked for a bare comma-separated list but regularly wrap it in
/// a code fence, prefix it with a label or answer one keyword per line.
pub fn parse_keyword_list(content: &str) -> Vec<String> {
    let mut body = content.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop an optional language tag on the fence line
        body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    }
    let body = body.trim().trim_end_matches("```").trim();
    let body = strip_label(body);

    let mut seen = HashSet::new();
    body.split([',', '\n'])
        .map(|k| {
            k.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .trim_matches(['"', '\''])
                .trim()
        })
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

fn strip_label(body: &str) -> &str {
    const LABELS: &[&str] = &["keywords:", "search keywords:"];
    let lower = body.to_lowercase();
    for label in LABELS {
        if lower.starts_with(label) {
            if let Some(rest) = body.get(label.len()..) {
                return rest.trim_start();
            }
        }
    }
    body
}
