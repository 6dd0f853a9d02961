//! Readiness gate
//!
//! Polls a dependency until it answers or a deadline passes. Each call to
//! [`ReadinessGate::wait`] starts its own clock, so two targets waited on in
//! sequence each get the full timeout.

use crate::config::FixtureConfig;
use crate::error::{FixtureError, Result};
use crate::query_service::QueryServiceClient;
use crate::store::{self, StoreParams};
use deadpool_postgres::Pool;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Errors that can tell a "not up yet" failure from any other.
pub trait Connectivity {
    fn is_connectivity_failure(&self) -> bool;
}

/// Every driver error raised while opening and pinging a connection counts
/// as the server not being ready, including authentication and missing
/// database errors from a server still running its init scripts.
impl Connectivity for tokio_postgres::Error {
    fn is_connectivity_failure(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadinessGate {
    timeout: Duration,
    poll_interval: Duration,
}

impl ReadinessGate {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_config(config: &FixtureConfig) -> Self {
        Self::new(config.retry_timeout, config.retry_interval)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `attempt` until it succeeds.
    ///
    /// A connectivity failure is retried after the poll interval as long as
    /// less than `timeout` has passed since the first attempt; after that the
    /// last error is returned as-is. Any other failure is returned at once.
    ///
    /// Each attempt is cut off when the deadline passes. The last error from
    /// an earlier attempt is returned then; if no attempt ever finished the
    /// result is [`WaitError::DeadlineExceeded`].
    pub async fn wait<T, E, F, Fut>(
        &self,
        target: &str,
        mut attempt: F,
    ) -> std::result::Result<T, WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Connectivity + Display,
    {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut attempts: u32 = 0;
        let mut last_error: Option<E> = None;

        loop {
            attempts += 1;

            // Timeout polls the attempt before the timer, so an attempt that
            // completes immediately is never cut off
            let outcome = match timeout_at(deadline, attempt()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let waited = start.elapsed();
                    warn!(
                        "Gave up waiting for {} after {} attempts ({:?}): attempt still running at the deadline",
                        target, attempts, waited
                    );
                    return Err(match last_error {
                        Some(e) => WaitError::Failed(e),
                        None => WaitError::DeadlineExceeded { waited },
                    });
                }
            };

            match outcome {
                Ok(value) => {
                    if attempts > 1 {
                        info!(
                            "{} ready after {} attempts ({:?})",
                            target,
                            attempts,
                            start.elapsed()
                        );
                    } else {
                        debug!("{} ready", target);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_connectivity_failure() => {
                    warn!("{} failed with a non-retryable error: {}", target, e);
                    return Err(WaitError::Failed(e));
                }
                Err(e) => {
                    let elapsed = start.elapsed();
                    if elapsed < self.timeout {
                        debug!(
                            "{} not ready (attempt {}, {:?} elapsed): {}",
                            target, attempts, elapsed, e
                        );
                        last_error = Some(e);
                        sleep(self.poll_interval).await;
                    } else {
                        warn!(
                            "Gave up waiting for {} after {} attempts ({:?}): {}",
                            target, attempts, elapsed, e
                        );
                        return Err(WaitError::Failed(e));
                    }
                }
            }
        }
    }

    /// Wait until the primary store accepts a connection, then hand back a
    /// pool for it. On timeout the last driver error is returned inside
    /// [`FixtureError::StoreUnreachable`], or
    /// [`FixtureError::ReadinessTimeout`] if no attempt ever finished.
    pub async fn wait_for_store(&self, params: &StoreParams, max_size: usize) -> Result<Pool> {
        // Bad pool settings are a config error, not something to wait out
        let pool = store::create_pool(params, max_size)?;

        let target = format!("store {}", params.display_target());
        self.wait(&target, || store::connect(params))
            .await
            .map_err(|e| e.into_fixture_error(&target, FixtureError::StoreUnreachable))?;

        Ok(pool)
    }

    /// Wait until the query service runs `probe_query` to completion.
    ///
    /// A coordinator can list its workers before it is able to reach the
    /// backing store, so the probe should be a query that touches the store.
    pub async fn wait_for_query_service(
        &self,
        client: &QueryServiceClient,
        probe_query: &str,
    ) -> Result<()> {
        let target = format!("query service {}", client.base_url());
        self.wait(&target, || client.execute(probe_query))
            .await
            .map_err(|e| e.into_fixture_error(&target, FixtureError::QueryServiceUnreachable))?;
        Ok(())
    }
}

/// Why [`ReadinessGate::wait`] gave up.
#[derive(Debug)]
pub enum WaitError<E> {
    /// The error from the last attempt that finished, unchanged
    Failed(E),
    /// The deadline passed while the first attempt was still running
    DeadlineExceeded { waited: Duration },
}

impl<E> WaitError<E> {
    pub fn into_failure(self) -> Option<E> {
        match self {
            WaitError::Failed(e) => Some(e),
            WaitError::DeadlineExceeded { .. } => None,
        }
    }

    fn into_fixture_error(self, target: &str, failed: fn(E) -> FixtureError) -> FixtureError {
        match self {
            WaitError::Failed(e) => failed(e),
            WaitError::DeadlineExceeded { waited } => FixtureError::ReadinessTimeout {
                target: target.to_string(),
                waited,
            },
        }
    }
}
