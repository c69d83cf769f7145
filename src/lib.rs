//! # credgate
//!
//! **Inline credential-leak detection gate for login traffic.**
//!
//! credgate sits between clients and an origin authentication service. It
//! inspects login request bodies, fingerprints the submitted
//! username/password pair, checks the fingerprint against a database of
//! known-compromised credential hashes, tags the forwarded request with a
//! detection header, and asynchronously reports confirmed matches.
//!
//! Detection is fail-open by design: a failure anywhere in the detection
//! path never blocks the login it is inspecting. Only an unreachable origin
//! fails a request.
//!
//! ## Architecture
//!
//! - **[`gate`]** — HTTP gate server and the per-request pipeline orchestrator
//! - **[`body`]** — body parsing, field path resolution, credential validation
//! - **[`fingerprint`]** — credential normalization and digest engine
//! - **[`lookup`]** — known-credentials lookup client (fail-open)
//! - **[`report`]** — fire-and-forget match reporting
//! - **[`config`]** — TOML configuration with environment substitution
//! - **[`cli`]** — command-line interface (clap)
//! - **[`error`]** — unified error types using `thiserror`
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a starter configuration
//! credgate init
//!
//! # Provide the lookup service credential
//! export CREDGATE_AUTH_TOKEN=...
//!
//! # Start the gate
//! credgate start
//! ```

pub mod body;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod lookup;
pub mod report;
