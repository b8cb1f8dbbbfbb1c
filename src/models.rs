use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A prize won by a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Prize {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sponsor: Option<String>,
    #[serde(rename = "type", default)]
    pub prize_type: Option<String>,
    /// Backend fields not modeled above (detail, emoji, sponsor_organization, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A hackathon project as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub uuid: String,
    pub slug: Option<String>,
    pub emoji: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub how_its_made: Option<String>,
    pub source_code_url: Option<String>,
    pub url: Option<String>,
    pub event_name: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub screenshots: Vec<String>,
    pub video_file_url: Option<String>,
    pub video_mux_url: Option<String>,
    pub video_mux_thumbnail_url: Option<String>,
    pub primary_repository_url: Option<String>,
    pub prizes: Vec<Prize>,
    pub score: Option<f64>,
    pub highlights: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarProject {
    pub uuid: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
    pub total_pages: u32,
}

/// Search results plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Project>,
    pub pagination: Pagination,
}

/// Facet values for the search filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TypesResponse {
    pub types: Vec<String>,
    pub event_names: Vec<String>,
    pub sponsor_organizations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub event_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub similarity_score: f64,
}

/// Similarity graph for the visualization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Chat reply: a short summary plus the projects it talks about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    pub message: String,
    pub projects: Vec<Project>,
}

/// POST /api/chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ExpandRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_expand_page_size")]
    pub page_size: u32,
}

/// POST /api/chat/message request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /api/graph request. Facets are comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphRequest {
    pub query: Option<String>,
    pub events: Option<String>,
    pub types: Option<String>,
    pub organizations: Option<String>,
    pub threshold: Option<f64>,
}

/// GET /api/search query string
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_search_page_size")]
    pub page_size: u32,
    pub events: Option<String>,
    pub types: Option<String>,
    pub organizations: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_expand_page_size() -> u32 {
    50
}

fn default_search_page_size() -> u32 {
    20
}

/// Body sent to the backend `POST /search`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchBody {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_organization: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<Vec<String>>,
}

impl From<&SearchParams> for SearchBody {
    fn from(params: &SearchParams) -> Self {
        Self {
            query: params.q.trim().to_string(),
            page: params.page.max(1),
            page_size: params.page_size.max(1),
            sponsor_organization: split_facet(params.organizations.as_deref()),
            prize_type: split_facet(params.types.as_deref()),
            event_name: split_facet(params.events.as_deref()),
        }
    }
}

/// Body sent to the backend `POST /graph`. The raw comma-separated facets
/// are sent alongside the split lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphBody {
    pub query: String,
    pub events: String,
    pub types: String,
    pub organizations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_organization: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<Vec<String>>,
}

impl From<&GraphRequest> for GraphBody {
    fn from(req: &GraphRequest) -> Self {
        let events = req.events.clone().unwrap_or_default();
        let types = req.types.clone().unwrap_or_default();
        let organizations = req.organizations.clone().unwrap_or_default();
        Self {
            query: req.query.clone().unwrap_or_default(),
            sponsor_organization: split_facet(Some(&organizations)),
            prize_type: split_facet(Some(&types)),
            event_name: split_facet(Some(&events)),
            events,
            types,
            organizations,
        }
    }
}

/// Split a comma-separated facet value. Returns `None` when nothing is selected.
pub fn split_facet(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_keeps_unknown_fields() {
        let raw = json!({
            "uuid": "abc",
            "name": "Zap",
            "prizes": [{"name": "Best DeFi", "type": "sponsor", "sponsor": "Acme", "emoji": "🏆"}],
            "created_at": "2024-05-01",
        });
        let project: Project = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(project.name.as_deref(), Some("Zap"));
        assert_eq!(project.prizes[0].prize_type.as_deref(), Some("sponsor"));
        assert_eq!(project.extra["created_at"], "2024-05-01");

        let back = serde_json::to_value(&project).unwrap();
        assert_eq!(back["created_at"], "2024-05-01");
        assert_eq!(back["prizes"][0]["type"], "sponsor");
        assert_eq!(back["prizes"][0]["emoji"], "🏆");
    }

    #[test]
    fn test_project_tolerates_missing_fields() {
        let project: Project = serde_json::from_value(json!({"uuid": "x"})).unwrap();
        assert!(project.prizes.is_empty());
        assert!(project.tagline.is_none());
    }

    #[test]
    fn test_split_facet() {
        assert_eq!(
            split_facet(Some("ETHGlobal London, ETHGlobal Paris")),
            Some(vec!["ETHGlobal London".to_string(), "ETHGlobal Paris".to_string()])
        );
        assert_eq!(split_facet(Some("")), None);
        assert_eq!(split_facet(Some(" , ")), None);
        assert_eq!(split_facet(None), None);
    }

    #[test]
    fn test_search_body_omits_empty_facets() {
        let params = SearchParams {
            q: " wallet ".into(),
            page: 0,
            page_size: 20,
            events: None,
            types: Some("finalist".into()),
            organizations: Some(String::new()),
        };
        let body = serde_json::to_value(SearchBody::from(&params)).unwrap();
        assert_eq!(body["query"], "wallet");
        assert_eq!(body["page"], 1);
        assert_eq!(body["prize_type"], json!(["finalist"]));
        assert!(body.get("sponsor_organization").is_none());
        assert!(body.get("event_name").is_none());
    }

    #[test]
    fn test_graph_body_keeps_raw_facets() {
        let req = GraphRequest {
            events: Some("A,B".into()),
            ..Default::default()
        };
        let body = GraphBody::from(&req);
        assert_eq!(body.events, "A,B");
        assert_eq!(body.event_name, Some(vec!["A".into(), "B".into()]));
        assert_eq!(body.query, "");
        assert!(body.prize_type.is_none());
    }

    #[test]
    fn test_expand_request_defaults() {
        let req: ExpandRequest = serde_json::from_value(json!({"query": "nft"})).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 50);
    }
}
