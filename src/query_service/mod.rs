//! Query service client
//!
//! Minimal client for a Presto/Trino-compatible coordinator, speaking the
//! HTTP statement protocol:
//!
//! 1. `POST {base}/v1/statement` with the SQL text as the body
//! 2. `GET nextUri` until the response carries no `nextUri`
//! 3. Rows arrive in the `data` field of any response along the way
//!
//! Only what the readiness probe and test assertions need is implemented.

mod error;
mod protocol;

pub use error::QueryServiceError;
pub use protocol::{QueryColumn, QueryError, QueryResults, QueryStats};

use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_USER: &str = "warehouse-fixtures";

#[derive(Debug, Clone)]
pub struct QueryServiceClient {
    http: reqwest::Client,
    base_url: Url,
    user: String,
    catalog: Option<String>,
    schema: Option<String>,
}

/// Rows returned by a completed statement
#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub columns: Vec<QueryColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryServiceClient {
    /// Accepts `presto://user@host:port/catalog/schema`, `trino://...` or a
    /// plain `http(s)://` coordinator URL with the same optional path.
    pub fn from_url(url: &str) -> Result<Self, QueryServiceError> {
        let parsed = Url::parse(url).map_err(|e| QueryServiceError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let http_scheme = match parsed.scheme() {
            "presto" | "trino" | "http" => "http",
            "https" => "https",
            other => {
                return Err(QueryServiceError::InvalidUrl {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| QueryServiceError::InvalidUrl {
                url: url.to_string(),
                reason: "no host".to_string(),
            })?;

        let port = parsed.port().unwrap_or(match http_scheme {
            "https" => 443,
            _ => DEFAULT_PORT,
        });

        let base_url = Url::parse(&format!("{}://{}:{}/", http_scheme, host, port)).map_err(|e| {
            QueryServiceError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let user = urlencoding::decode(parsed.username())
            .map(|u| u.into_owned())
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let mut segments = parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let catalog = segments.next();
        let schema = segments.next();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            user,
            catalog,
            schema,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Run a statement to completion and collect every row.
    pub async fn execute(&self, sql: &str) -> Result<QueryOutput, QueryServiceError> {
        let statement_url = self
            .base_url
            .join("v1/statement")
            .map_err(|e| QueryServiceError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let mut request = self
            .http
            .post(statement_url)
            .header("X-Presto-User", &self.user)
            .header("X-Trino-User", &self.user)
            .header("X-Presto-Source", DEFAULT_USER)
            .body(sql.to_string());
        if let Some(catalog) = &self.catalog {
            request = request
                .header("X-Presto-Catalog", catalog)
                .header("X-Trino-Catalog", catalog);
        }
        if let Some(schema) = &self.schema {
            request = request
                .header("X-Presto-Schema", schema)
                .header("X-Trino-Schema", schema);
        }

        let mut results = read_results(request.send().await?).await?;
        let mut output = QueryOutput::default();

        loop {
            if let Some(error) = results.error.take() {
                return Err(error.into());
            }
            if output.columns.is_empty() {
                if let Some(columns) = results.columns.take() {
                    output.columns = columns;
                }
            }
            if let Some(rows) = results.data.take() {
                output.rows.extend(rows);
            }

            let Some(next_uri) = results.next_uri.take() else {
                break;
            };

            debug!("Query {} state {}, following {}", results.id, results.state(), next_uri);
            let response = self
                .http
                .get(&next_uri)
                .header("X-Presto-User", &self.user)
                .header("X-Trino-User", &self.user)
                .send()
                .await?;
            results = read_results(response).await?;
        }

        Ok(output)
    }
}

async fn read_results(response: reqwest::Response) -> Result<QueryResults, QueryServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(QueryServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<QueryResults>().await?)
}
