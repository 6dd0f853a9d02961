use crate::query_service::QueryServiceError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    /// The primary store never accepted a connection within the retry
    /// timeout. Carries the last connection error unchanged.
    #[error(transparent)]
    StoreUnreachable(tokio_postgres::Error),

    /// The query service never answered the probe query within the retry
    /// timeout. Carries the last error unchanged.
    #[error(transparent)]
    QueryServiceUnreachable(QueryServiceError),

    /// The retry timeout passed while the first attempt was still hanging,
    /// so the target never produced an error of its own.
    #[error("Timed out after {waited:?} waiting for {target}")]
    ReadinessTimeout { target: String, waited: Duration },

    #[error(transparent)]
    Store(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Circular dependency detected in table definitions: {tables}")]
    CircularDependency { tables: String },
}

impl FixtureError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        FixtureError::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for the errors raised when a readiness wait runs out of time.
    pub fn is_connectivity_timeout(&self) -> bool {
        matches!(
            self,
            FixtureError::StoreUnreachable(_)
                | FixtureError::QueryServiceUnreachable(_)
                | FixtureError::ReadinessTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = FixtureError::invalid_config("CONNECTION_RETRY_TIMEOUT must be a number");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: CONNECTION_RETRY_TIMEOUT must be a number"
        );
        assert!(!err.is_connectivity_timeout());
    }

    #[test]
    fn test_query_service_unreachable_is_transparent() {
        let inner = QueryServiceError::Query {
            name: "NO_NODES_AVAILABLE".to_string(),
            message: "No nodes available to run query".to_string(),
        };
        let expected = inner.to_string();
        let err = FixtureError::QueryServiceUnreachable(inner);

        assert_eq!(err.to_string(), expected);
        assert!(err.is_connectivity_timeout());
    }

    #[test]
    fn test_readiness_timeout_names_target() {
        let err = FixtureError::ReadinessTimeout {
            target: "store db:5432/warehouse".to_string(),
            waited: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 60s waiting for store db:5432/warehouse"
        );
        assert!(err.is_connectivity_timeout());
    }
}
