//! Warehouse Fixtures Library
//!
//! Provisions a mock clinical data warehouse for cohort-extraction
//! integration tests: waits for the backing PostgreSQL store and the query
//! service in front of it, then creates the mock tables.

pub mod config;
pub mod error;
pub mod fixture;
pub mod model;
pub mod query_service;
pub mod readiness;
pub mod schema;
pub mod store;

pub use config::FixtureConfig;
pub use error::{FixtureError, Result};
pub use fixture::FixtureDatabase;
pub use readiness::{Connectivity, ReadinessGate, WaitError};
