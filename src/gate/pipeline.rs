//! Per-request detection pipeline.
//!
//! Sequencing per request: parse body → validate → normalize + digest →
//! lookup → forward to origin with the detection header → relay the
//! response → conditionally report. Every detection-path failure degrades to
//! "no match" and the request still forwards; only an unreachable origin
//! fails the request (502), because the gate has no fallback origin.
//!
//! The lookup always completes (or is skipped) before the origin call is
//! issued, because the detection header value depends on it. The report call
//! is dispatched without being awaited.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use tracing::{debug, error, info, warn};

use crate::body;
use crate::fingerprint;
use crate::gate::headers::strip_unsafe;
use crate::gate::GateState;
use crate::lookup::log_prefix;
use crate::report;

/// Upper bound on buffered request and response bodies.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Handle one inbound request end to end.
pub async fn handle(State(state): State<Arc<GateState>>, request: Request) -> Response {
    let (parts, request_body) = request.into_parts();

    let bytes = match axum::body::to_bytes(request_body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // Unreadable input degrades like unparseable input: forward anyway.
            warn!("failed to read request body: {}", e);
            Bytes::new()
        }
    };

    // Requesting-host label for reporting, captured before header stripping.
    let group = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.report.group.clone());

    let match_id = detect(&state, &parts.headers, &bytes).await;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!(
        "{}{}",
        state.config.origin.url.trim_end_matches('/'),
        path_and_query
    );

    let mut outbound = strip_unsafe(&parts.headers);
    outbound.insert(
        state.detection_header.clone(),
        HeaderValue::from_static(if match_id.is_some() { "true" } else { "false" }),
    );

    let origin_response = state
        .origin_client
        .request(parts.method.clone(), &url)
        .headers(outbound)
        .body(bytes)
        .send()
        .await;

    let origin_response = match origin_response {
        Ok(response) => response,
        Err(e) => {
            error!("origin call to {} failed: {}", url, e);
            return status_response(StatusCode::BAD_GATEWAY);
        }
    };

    if let Some(id) = &match_id {
        if origin_response.status().is_success() {
            info!(
                "login with known-compromised credential succeeded, reporting id {}…",
                log_prefix(id)
            );
            report::spawn_report(state.reporter.clone(), id.clone(), group);
        }
    }

    relay(origin_response).await
}

/// Run the detection stages: parse, validate, fingerprint, lookup.
///
/// Returns the match identifier when the submitted pair is known-compromised
/// and `None` in every other case: invalid body, fingerprint failure,
/// skipped or failed lookup.
async fn detect(state: &GateState, headers: &HeaderMap, bytes: &[u8]) -> Option<String> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let parsed = body::parse(content_type, bytes);

    if !body::is_valid(parsed.as_ref(), &state.config.credentials) {
        debug!("request body has no usable credentials; skipping lookup");
        return None;
    }

    // is_valid guarantees the body and both paths resolve.
    let parsed = parsed?;
    let username = body::resolve(&parsed, &state.config.credentials.username_path)?;
    let password = body::resolve(&parsed, &state.config.credentials.password_path)?;

    let input = match fingerprint::normalize(username, password) {
        Ok(input) => input,
        Err(e) => {
            warn!("could not fingerprint credentials: {}", e);
            return None;
        }
    };
    let digest = fingerprint::digest_hex(state.config.lookup.algorithm, &input);

    let Some(lookup) = &state.lookup else {
        info!(
            "no lookup credential configured; skipping check for digest {}…",
            log_prefix(&digest)
        );
        return None;
    };

    lookup.lookup(&digest).await
}

/// Relay the origin's response to the client with unsafe headers stripped.
async fn relay(origin_response: reqwest::Response) -> Response {
    let status = origin_response.status();
    let headers = strip_unsafe(origin_response.headers());

    let body = match origin_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to read origin response body: {}", e);
            return status_response(StatusCode::BAD_GATEWAY);
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn status_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
