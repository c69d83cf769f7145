//! Match reporting for confirmed logins with known-compromised credentials.
//!
//! When a forwarded login both matched the lookup database and succeeded at
//! the origin, the gate notifies the reporting service. Reports use a
//! **fire-and-forget** pattern: they are spawned as background tasks and
//! never block or fail the request that triggered them. Delivery is
//! at-most-once; a lost report is acceptable, a delayed login is not.
//!
//! The [`Reporter`] trait abstracts over reporting backends so tests can
//! substitute a mock. The production implementation is [`HttpReporter`].

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::{CredGateError, Result};
use crate::lookup::log_prefix;

/// Bounded timeout so a stalled report service cannot pile up tasks.
const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for match-report backends.
///
/// Implementations must be `Send + Sync` for use across async tasks.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    /// Deliver a report for the given match identifier and group label.
    async fn report(&self, match_id: &str, group: &str) -> Result<()>;
    /// Return the backend name (e.g., `"http"`).
    fn name(&self) -> &str;
}

/// Dispatch a report in the background and discard the outcome.
///
/// Failures are logged with a truncated match id; nothing is retried or
/// surfaced to the caller.
pub fn spawn_report(reporter: Arc<dyn Reporter>, match_id: String, group: String) {
    tokio::spawn(async move {
        if let Err(e) = reporter.report(&match_id, &group).await {
            warn!(
                "match report for id {}… via {} failed: {}",
                log_prefix(&match_id),
                reporter.name(),
                e
            );
        }
    });
}

/// Sends match reports to the reporting service over HTTP.
pub struct HttpReporter {
    client: reqwest::Client,
    url: String,
    auth: Option<String>,
}

impl HttpReporter {
    pub fn new(url: String, auth: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REPORT_TIMEOUT)
            .build()
            .map_err(|e| CredGateError::Config(e.to_string()))?;
        Ok(Self { client, url, auth })
    }
}

#[async_trait::async_trait]
impl Reporter for HttpReporter {
    async fn report(&self, match_id: &str, group: &str) -> Result<()> {
        let mut request = self.client.post(&self.url).json(&serde_json::json!({
            "id": match_id,
            "group": group,
        }));
        if let Some(auth) = &self.auth {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| CredGateError::Report(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CredGateError::Report(format!(
                "report service returned {}",
                resp.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
