use crate::config::FixtureConfig;
use crate::error::{FixtureError, Result};
use crate::query_service::QueryServiceClient;
use crate::readiness::ReadinessGate;
use crate::schema::SchemaDeployer;
use crate::store::StoreParams;
use deadpool_postgres::Pool;
use tracing::info;

/// Handle to a mock warehouse whose store and query service have both
/// answered.
pub struct FixtureDatabase {
    pool: Pool,
    query_service: QueryServiceClient,
    deployer: SchemaDeployer,
}

impl FixtureDatabase {
    /// Wait for the store, then for the query service, each with the full
    /// configured timeout.
    pub async fn connect(config: &FixtureConfig) -> Result<Self> {
        let params = StoreParams::from_url(&config.datasource_url)?;
        let query_service = QueryServiceClient::from_url(&config.query_service_url)
            .map_err(|e| FixtureError::invalid_config(e.to_string()))?;
        let gate = ReadinessGate::from_config(config);

        info!(
            "Waiting for store {} (timeout {:?})",
            params.display_target(),
            gate.timeout()
        );
        let pool = gate.wait_for_store(&params, config.pool_max_size).await?;

        info!(
            "Waiting for query service {} (timeout {:?})",
            query_service.base_url(),
            gate.timeout()
        );
        gate.wait_for_query_service(&query_service, &config.probe_query)
            .await?;

        Ok(Self {
            pool,
            query_service,
            deployer: SchemaDeployer::new(),
        })
    }

    /// Connect and create every mock table that is missing.
    pub async fn make_database(config: &FixtureConfig) -> Result<Self> {
        let database = Self::connect(config).await?;
        database.create_all().await?;
        Ok(database)
    }

    pub async fn create_all(&self) -> Result<()> {
        self.deployer.create_all(&self.pool).await
    }

    /// Empty every mock table, e.g. between tests.
    pub async fn reset(&self) -> Result<()> {
        self.deployer.truncate_all(&self.pool).await
    }

    pub async fn drop_all(&self) -> Result<()> {
        self.deployer.drop_all(&self.pool).await
    }

    /// A pooled connection for inserting and reading fixture rows
    pub async fn client(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn deployer(&self) -> &SchemaDeployer {
        &self.deployer
    }

    pub fn query_service(&self) -> &QueryServiceClient {
        &self.query_service
    }
}
