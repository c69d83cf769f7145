//! Client for the known-credentials lookup service.
//!
//! The lookup is **fail-open**: any transport failure, non-success status,
//! or malformed response yields "no match" with a diagnostic. A detection
//! outage must never block the login flow it is inspecting.
//!
//! The service has shipped two response shapes across deployment iterations:
//! a direct `{"id": "<uuid>"}` (authoritative) and a nested
//! `{"id": {"id": "<uuid>"}}`. Both are accepted; `id` may also be `null`
//! for a clean miss. A returned id counts as a match only when it is exactly
//! 36 characters (UUID-shaped, not full UUID grammar).

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CredGateError, Result};

/// Header carrying the credential digest to the lookup service.
pub const DIGEST_HEADER: &str = "x-credential-digest";

/// Expected length of a match identifier (UUID-shaped).
const MATCH_ID_LEN: usize = 36;

/// How many characters of a digest or match id may appear in logs.
const LOG_PREFIX_LEN: usize = 8;

/// Bounded timeout so a stalled lookup service cannot wedge logins.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Truncate a sensitive value to a short non-reversible prefix for logging.
pub(crate) fn log_prefix(value: &str) -> &str {
    &value[..value.len().min(LOG_PREFIX_LEN)]
}

/// Response body of the lookup service.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    id: Option<IdField>,
}

/// The two id shapes seen across lookup service deployments.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdField {
    Direct(String),
    Nested {
        #[serde(default)]
        id: Option<String>,
    },
}

/// Queries the known-credentials lookup service for a digest.
pub struct LookupClient {
    client: reqwest::Client,
    url: String,
    auth: String,
}

impl LookupClient {
    pub fn new(url: String, auth: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| CredGateError::Config(e.to_string()))?;
        Ok(Self { client, url, auth })
    }

    /// Check a digest against the lookup service.
    ///
    /// Returns the match identifier when the digest is known-compromised,
    /// `None` otherwise. Never errors: every failure path degrades to
    /// `None` with a diagnostic.
    pub async fn lookup(&self, digest: &str) -> Option<String> {
        match self.try_lookup(digest).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "credential lookup failed for digest {}… (fail-open): {}",
                    log_prefix(digest),
                    e
                );
                None
            }
        }
    }

    async fn try_lookup(&self, digest: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(&self.url)
            .header(DIGEST_HEADER, digest)
            .header(reqwest::header::AUTHORIZATION, &self.auth)
            .send()
            .await
            .map_err(|e| CredGateError::Lookup(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CredGateError::Lookup(format!(
                "lookup service returned {}",
                resp.status()
            )));
        }

        let body: LookupResponse = resp
            .json()
            .await
            .map_err(|e| CredGateError::Lookup(e.to_string()))?;

        Ok(extract_match_id(body))
    }
}

/// Interpret a lookup response into an optional match identifier.
///
/// Lenient on purpose: a malformed positive is safer treated as a negative
/// than as a crash.
fn extract_match_id(response: LookupResponse) -> Option<String> {
    let id = match response.id {
        Some(IdField::Direct(id)) => id,
        Some(IdField::Nested { id: Some(id) }) => id,
        Some(IdField::Nested { id: None }) | None => return None,
    };

    if id.chars().count() != MATCH_ID_LEN {
        warn!(
            "lookup returned id of unexpected length {} ({}…); treating as no match",
            id.chars().count(),
            log_prefix(&id)
        );
        return None;
    }

    debug!("credential digest matched known-compromised id {}…", log_prefix(&id));
    Some(id)
}
