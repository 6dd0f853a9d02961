use crate::error::{FixtureError, Result};
use crate::store::{StoreParams, CONNECT_TIMEOUT};
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use std::time::Duration;
use tokio_postgres::{Client, NoTls};
use tracing::debug;

/// Build a connection pool for the store. No connection is opened until the
/// first `pool.get()`.
pub fn create_pool(params: &StoreParams, max_size: usize) -> Result<Pool> {
    let mut cfg = PoolConfig::new();
    cfg.host = Some(params.host.clone());
    cfg.port = Some(params.port);
    cfg.dbname = Some(params.database.clone());
    cfg.user = Some(params.user.clone());
    cfg.password = params.password.clone();
    cfg.application_name = Some("warehouse-fixtures".to_string());
    cfg.connect_timeout = Some(CONNECT_TIMEOUT);

    cfg.pool = Some(deadpool_postgres::PoolConfig {
        max_size,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(5)),
            recycle: Some(Duration::from_secs(5)),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| FixtureError::invalid_config(format!("Failed to create pool: {}", e)))
}

/// Open a single connection and ping it. Any failure comes back as the
/// driver's own error.
pub async fn connect(params: &StoreParams) -> std::result::Result<Client, tokio_postgres::Error> {
    let (client, connection) = params.to_pg_config().connect(NoTls).await?;

    let target = params.display_target();
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("Connection to {} closed with error: {}", target, e);
        }
    });

    client.simple_query("SELECT 1").await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StoreParams {
        StoreParams::from_url("postgres://fixtures:pw@127.0.0.1:1/warehouse").unwrap()
    }

    #[tokio::test]
    async fn test_create_pool_does_not_connect() {
        let pool = create_pool(&params(), 2).unwrap();
        let status = pool.status();
        assert_eq!(status.max_size, 2);
        assert_eq!(status.size, 0);
    }

    #[tokio::test]
    async fn test_connect_refused_returns_driver_error() {
        // Port 1 is never a PostgreSQL server
        let err = match connect(&params()).await {
            Ok(_) => panic!("nothing listens on port 1"),
            Err(e) => e,
        };
        assert!(err.as_db_error().is_none());
    }
}
