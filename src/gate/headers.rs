//! Hop-by-hop and unsafe header stripping.
//!
//! Headers in [`UNSAFE_HEADER_NAMES`] must never be forwarded on either leg:
//! they describe the connection or encoding of the hop they arrived on, and
//! relaying them breaks framing (content-length after a body rewrite) or
//! leaks proxy credentials. The set is a fixed, human-reviewed constant;
//! comparison is case-insensitive.

use axum::http::HeaderMap;

/// Header names stripped from forwarded requests and relayed responses.
pub const UNSAFE_HEADER_NAMES: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "vary",
    "accept-encoding",
    "content-encoding",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "upgrade",
];

/// Returns true if the header name is in the unsafe set (case-insensitive).
pub fn is_unsafe(name: &str) -> bool {
    UNSAFE_HEADER_NAMES
        .iter()
        .any(|unsafe_name| name.eq_ignore_ascii_case(unsafe_name))
}

/// Copy a header map, dropping every unsafe header.
pub fn strip_unsafe(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        if !is_unsafe(name.as_str()) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
