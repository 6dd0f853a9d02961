use crate::query_service::QueryError;
use crate::readiness::Connectivity;
use thiserror::Error;

/// Query error names the coordinator reports while it is still coming up
const STARTUP_ERROR_NAMES: [&str; 2] = ["NO_NODES_AVAILABLE", "SERVER_STARTING_UP"];

#[derive(Debug, Error)]
pub enum QueryServiceError {
    #[error("Query service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Query failed ({name}): {message}")]
    Query { name: String, message: String },

    #[error("Invalid query service URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<QueryError> for QueryServiceError {
    fn from(err: QueryError) -> Self {
        QueryServiceError::Query {
            name: err.error_name.unwrap_or_else(|| "UNKNOWN".to_string()),
            message: err.message,
        }
    }
}

impl Connectivity for QueryServiceError {
    fn is_connectivity_failure(&self) -> bool {
        match self {
            QueryServiceError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            QueryServiceError::Status { status, .. } => matches!(status, 502 | 503 | 504),
            QueryServiceError::Query { name, message } => {
                STARTUP_ERROR_NAMES.contains(&name.as_str())
                    || message.contains("still initializing")
            }
            QueryServiceError::InvalidUrl { .. } => false,
        }
    }
}
