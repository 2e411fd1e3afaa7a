//! Client key extraction for rate limit bucketing.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;

use crate::observability::metrics;

/// Bucket key for callers that cannot be identified at all.
///
/// Falling through to this constant means every unidentified client shares
/// one rate-limit bucket. That is intentional degradation, not a bug: a
/// shared bucket still throttles anonymous abuse, at coarser granularity.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive a stable identifying key for the caller.
///
/// Precedence reflects trust, most- to least-authoritative, first non-empty
/// wins:
/// 1. the connection-level peer address,
/// 2. the first entry of `X-Forwarded-For` (comma-separated, trimmed),
/// 3. `X-Real-IP`,
/// 4. [`UNKNOWN_CLIENT`].
pub fn extract_key(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    // X-Forwarded-For: client, proxy1, proxy2 -- leftmost is the original client.
    if let Some(forwarded) = header_str(request, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = header_str(request, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    tracing::debug!(
        path = %request.uri().path(),
        "No client identity available, using shared fallback bucket"
    );
    metrics::record_unidentified_client();
    UNKNOWN_CLIENT.to_string()
}

fn header_str<'a>(request: &'a Request<Body>, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}
