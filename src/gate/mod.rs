//! The gate server: inbound HTTP surface and shared per-request state.
//!
//! Every inbound request runs its own independent pipeline instance
//! ([`pipeline::handle`]); the only shared resource is the read-only
//! configuration and the HTTP clients, so no locking is needed.

pub mod headers;
pub mod pipeline;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::GateConfig;
use crate::error::{CredGateError, Result};
use crate::lookup::LookupClient;
use crate::report::{HttpReporter, Reporter};

/// Shared state for all pipeline instances.
///
/// Read-only at request time: configuration, the pre-parsed detection header
/// name, and the outbound clients.
pub struct GateState {
    /// Gate configuration.
    pub config: GateConfig,
    /// Detection header name, validated at startup.
    pub detection_header: HeaderName,
    /// Client for the origin call. No timeout: the gate has no authority to
    /// time out the primary login flow. Redirects are relayed, not followed.
    pub origin_client: reqwest::Client,
    /// Lookup client; `None` when no auth credential is configured, in which
    /// case every lookup is skipped.
    pub lookup: Option<LookupClient>,
    /// Match report backend.
    pub reporter: Arc<dyn Reporter>,
}

impl GateState {
    pub fn from_config(config: GateConfig) -> Result<Self> {
        let detection_header = HeaderName::from_bytes(config.detection.header.as_bytes())
            .map_err(|_| {
                CredGateError::Config(format!(
                    "invalid detection header name: {}",
                    config.detection.header
                ))
            })?;

        let origin_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CredGateError::Config(e.to_string()))?;

        let lookup = match &config.lookup.auth {
            Some(auth) => Some(LookupClient::new(
                config.lookup.url.clone(),
                auth.clone(),
            )?),
            None => None,
        };

        let reporter: Arc<dyn Reporter> = Arc::new(HttpReporter::new(
            config.report.url.clone(),
            config.lookup.auth.clone(),
        )?);

        Ok(Self {
            config,
            detection_header,
            origin_client,
            lookup,
            reporter,
        })
    }
}

/// Build the axum router: every method and path goes through the pipeline.
pub fn router(state: Arc<GateState>) -> Router {
    Router::new().fallback(pipeline::handle).with_state(state)
}

pub struct GateServer {
    config: GateConfig,
}

impl GateServer {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Start the gate server and return the actual bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let state = Arc::new(GateState::from_config(self.config.clone())?);
        let app = router(state);

        let listener = TcpListener::bind(&self.config.server.listen).await?;
        let local_addr = listener.local_addr()?;
        info!("credgate listening on {}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("gate server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
