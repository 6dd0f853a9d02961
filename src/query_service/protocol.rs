use serde::Deserialize;
use serde_json::Value;

/// One response document of the statement protocol
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    #[serde(default)]
    pub next_uri: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<QueryColumn>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub stats: Option<QueryStats>,
    #[serde(default)]
    pub error: Option<QueryError>,
}

impl QueryResults {
    pub fn state(&self) -> &str {
        self.stats
            .as_ref()
            .map(|s| s.state.as_str())
            .unwrap_or("UNKNOWN")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryStats {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_running_page() {
        let results: QueryResults = serde_json::from_str(
            r#"{
                "id": "20240101_000000_00001_abcde",
                "infoUri": "http://coordinator:8080/ui/query.html?20240101_000000_00001_abcde",
                "nextUri": "http://coordinator:8080/v1/statement/executing/20240101_000000_00001_abcde/1",
                "stats": { "state": "RUNNING", "queued": false }
            }"#,
        )
        .unwrap();

        assert_eq!(results.state(), "RUNNING");
        assert!(results.next_uri.is_some());
        assert!(results.data.is_none());
        assert!(results.error.is_none());
    }

    #[test]
    fn test_parse_failed_page() {
        let results: QueryResults = serde_json::from_str(
            r#"{
                "id": "q",
                "stats": { "state": "FAILED" },
                "error": {
                    "message": "Presto server is still initializing",
                    "errorCode": 65549,
                    "errorName": "SERVER_STARTING_UP",
                    "errorType": "INTERNAL_ERROR"
                }
            }"#,
        )
        .unwrap();

        let error = results.error.unwrap();
        assert_eq!(error.error_name.as_deref(), Some("SERVER_STARTING_UP"));
        assert_eq!(error.error_code, Some(65549));
    }
}
