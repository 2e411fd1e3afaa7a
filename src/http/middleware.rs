//! The gate middleware: one pass/fail/modify decision per request.
//!
//! Per-request states:
//! `classify → {exempt | limited} → {allowed | denied} → decorate`.
//! Exempt requests skip the limiter but are still decorated. Denial is
//! terminal: the downstream handler is never invoked and the rejection
//! response goes out undecorated. There are no retries at this layer.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, CONTENT_TYPE, RETRY_AFTER},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::config::GateConfig;
use crate::observability::metrics;
use crate::security::{client_key, headers, FixedWindowLimiter, PathClassifier, RateLimitPolicy};

/// Machine-readable body of the 429 rejection.
#[derive(Serialize)]
struct RejectionBody {
    error: &'static str,
    message: &'static str,
}

const REJECTION: RejectionBody = RejectionBody {
    error: "Too Many Requests",
    message: "Rate limit exceeded. Please try again later.",
};

/// Shared, read-only state for the gate middleware.
///
/// Everything derivable from config is computed once here; the per-request
/// path only does map access and header copies.
pub struct GateState {
    limiter: Arc<FixedWindowLimiter>,
    classifier: PathClassifier,
    security_headers: Vec<(HeaderName, HeaderValue)>,
    retry_after: HeaderValue,
    rejection_body: String,
}

impl GateState {
    pub fn new(config: &GateConfig) -> Self {
        let policy = RateLimitPolicy {
            max_requests: config.rate_limit.max_requests,
            window: std::time::Duration::from_millis(config.rate_limit.window_ms),
        };
        let retry_after = HeaderValue::from_str(&policy.window_secs().to_string())
            .expect("whole seconds form a valid header value");
        let rejection_body =
            serde_json::to_string(&REJECTION).expect("static rejection body serializes");

        Self {
            limiter: Arc::new(FixedWindowLimiter::new(policy)),
            classifier: PathClassifier::new(config.classifier.limited_prefixes.clone()),
            security_headers: headers::compose(config.security.production),
            retry_after,
            rejection_body,
        }
    }

    pub fn limiter(&self) -> Arc<FixedWindowLimiter> {
        self.limiter.clone()
    }

    fn rejection_response(&self) -> Response {
        let mut response = Response::new(Body::from(self.rejection_body.clone()));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(RETRY_AFTER, self.retry_after.clone());
        response
    }
}

/// Middleware function wrapping every downstream handler.
pub async fn gate_middleware(
    State(state): State<Arc<GateState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if state.classifier.is_limited(&path) {
        let key = client_key::extract_key(&request);
        // The limiter decision is synchronous; no lock or map guard is held
        // once `allow` returns, so nothing is pinned across the await below.
        if !state.limiter.allow(&key, Instant::now()) {
            tracing::warn!(client = %key, path = %path, "Rate limit exceeded");
            metrics::record_outcome("denied");
            metrics::record_rate_limited();
            return state.rejection_response();
        }
        tracing::debug!(client = %key, path = %path, "Request within rate limit");
        metrics::record_outcome("allowed");
    } else {
        metrics::record_outcome("exempt");
    }

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), &state.security_headers);
    response
}

/// Decorate a response with the composed security headers.
///
/// Additive: a header the downstream handler already set is preserved. The
/// one exception is Content-Security-Policy, which this layer always sets —
/// it is security-critical and must not be weakened from below.
fn apply_security_headers(headers: &mut HeaderMap, composed: &[(HeaderName, HeaderValue)]) {
    for (name, value) in composed {
        if *name == CONTENT_SECURITY_POLICY || !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
}
