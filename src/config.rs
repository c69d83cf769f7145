//! TOML configuration types for credgate.
//!
//! The top-level [`GateConfig`] is deserialized from `credgate.toml` and
//! contains sections for the listen address, the origin service, the
//! credential field policy, and the lookup/report/detection integration.
//!
//! # Example `credgate.toml`
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:18443"
//!
//! [origin]
//! url = "https://login.example.com"
//!
//! [credentials]
//! username_path = "username"
//! password_path = "password"
//!
//! [lookup]
//! url = "https://leaks.example.com/v1/check"
//! algorithm = "sha256"
//! auth = "${CREDGATE_AUTH_TOKEN}"
//!
//! [report]
//! url = "https://leaks.example.com/v1/report"
//!
//! [detection]
//! header = "X-Credential-Detected"
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CredGateError, Result};
use crate::fingerprint::HashAlgorithm;

/// Gate server configuration (`[server]` section).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., `"127.0.0.1:18443"`).
    pub listen: String,
}

/// Origin authentication service configuration (`[origin]` section).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginConfig {
    /// Base URL of the origin service; the inbound path and query are
    /// appended verbatim.
    pub url: String,
}

/// Credential field policy (`[credentials]` section).
///
/// Field paths are dotted keys with optional bracketed indices
/// (e.g., `"login.username"`, `"users[0].name"`), resolved against the
/// parsed request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Path to the username value inside the request body.
    pub username_path: String,
    /// Path to the password value inside the request body.
    pub password_path: String,
    /// Minimum accepted username length.
    #[serde(default = "default_min_username_len")]
    pub min_username_len: usize,
    /// Minimum accepted password length.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_min_username_len() -> usize {
    2
}

fn default_min_password_len() -> usize {
    3
}

/// Known-credentials lookup service configuration (`[lookup]` section).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Lookup endpoint URL.
    pub url: String,
    /// Digest algorithm applied to the normalized credential pair.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Authorization credential sent to the lookup and report services.
    /// Usually sourced from the environment via `${VAR}` substitution.
    /// When absent, lookups are skipped and every request forwards as
    /// "no match".
    #[serde(default)]
    pub auth: Option<String>,
}

/// Match reporting configuration (`[report]` section).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Report endpoint URL.
    pub url: String,
    /// Fallback group label used when the inbound request carries no
    /// `Host` header.
    #[serde(default = "default_group")]
    pub group: String,
}

fn default_group() -> String {
    "default".to_string()
}

/// Detection header configuration (`[detection]` section).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    /// Name of the header injected into the forwarded request, valued
    /// `"true"` or `"false"`.
    #[serde(default = "default_detection_header")]
    pub header: String,
}

fn default_detection_header() -> String {
    "X-Credential-Detected".to_string()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            header: default_detection_header(),
        }
    }
}

/// Top-level gate configuration deserialized from `credgate.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Origin service the gate fronts.
    pub origin: OriginConfig,
    /// Credential field paths and length policy.
    pub credentials: CredentialsConfig,
    /// Lookup service integration.
    pub lookup: LookupConfig,
    /// Report service integration.
    pub report: ReportConfig,
    /// Detection header settings.
    #[serde(default)]
    pub detection: DetectionConfig,
}

impl GateConfig {
    /// Load and parse the configuration from a TOML file at the given path.
    ///
    /// Before parsing, `${VAR}` and `$VAR` placeholders in the TOML text are
    /// replaced with the corresponding environment variable values. An error
    /// is returned if a referenced variable is not set.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = substitute_env_vars(&content)?;
        let config: GateConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Replace `${VAR_NAME}` and `$VAR_NAME` placeholders with environment variable values.
///
/// Returns an error containing the variable name if the variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    // Match ${VAR_NAME} (braces form)
    let re_braces = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    // Match $VAR_NAME (no braces, uppercase + underscore only to avoid false positives)
    let re_bare = Regex::new(r"\$([A-Z_][A-Z0-9_]*)").unwrap();

    let mut result = input.to_string();

    // First pass: ${VAR} form
    for cap in re_braces.captures_iter(input) {
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| CredGateError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    // Second pass: $VAR form (on already-substituted string, but only matches remaining $VAR)
    let intermediate = result.clone();
    for cap in re_bare.captures_iter(&intermediate) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| CredGateError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(full_match, &value);
    }

    Ok(result)
}
