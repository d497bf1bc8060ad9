use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DocumentResult, PlotPayload};

/// Body of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Body returned by `POST /api/search`.
///
/// `results` is ranked best first, and point `i` of the first plot trace
/// is `results[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub plot_data: PlotPayload,
    pub results: Vec<DocumentResult>,
}

impl SearchResponse {
    /// Check that the plot and the results can be cross-highlighted.
    pub fn validate(&self) -> Result<()> {
        self.plot_data.validate_against(self.results.len())
    }
}

/// Body returned by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_query_only() {
        let body = serde_json::to_value(SearchRequest::new("evidence of criminal activity")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"query": "evidence of criminal activity"})
        );
    }

    #[test]
    fn test_response_requires_both_fields() {
        let missing_plot = serde_json::from_value::<SearchResponse>(serde_json::json!({
            "results": []
        }));
        assert!(missing_plot.is_err());

        let missing_results = serde_json::from_value::<SearchResponse>(serde_json::json!({
            "plot_data": {"data": [], "layout": {}}
        }));
        assert!(missing_results.is_err());
    }

    #[test]
    fn test_empty_response_is_valid() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "plot_data": {"data": [], "layout": {}},
            "results": []
        }))
        .unwrap();
        assert!(response.validate().is_ok());
    }

    #[test]
    fn test_status_decodes() {
        let status: ApiStatus = serde_json::from_value(serde_json::json!({
            "status": "running",
            "version": "1.0",
            "api": "searchica",
            "environment": "development"
        }))
        .unwrap();
        assert_eq!(status.status, "running");
        assert_eq!(status.environment, "development");
    }
}
