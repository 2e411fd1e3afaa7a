//! Security response header composition.
//!
//! # Responsibilities
//! - Build the fixed set of protective response headers
//! - Collapse the CSP template into a single-line wire value
//!
//! # Design Decisions
//! - Pure function of the environment mode; composed once at startup and
//!   reused for every response
//! - HSTS only in production, so local plain-HTTP development is not pinned
//!   to HTTPS by a cached browser policy

use axum::http::header::{
    HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};

/// CSP directive template. Kept multi-line for readability; the composer
/// collapses it to a single line before it goes on the wire, since embedded
/// newlines make a header value invalid in most HTTP implementations.
const CSP_TEMPLATE: &str = "
    default-src 'self';
    script-src 'self' 'unsafe-inline';
    style-src 'self' 'unsafe-inline' https://fonts.googleapis.com;
    font-src 'self' https://fonts.gstatic.com;
    img-src 'self' data: https:;
    connect-src 'self';
    frame-ancestors 'none'
";

/// Replace every run of whitespace with a single space and trim the ends.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the ordered security header set for the given environment mode.
///
/// Output is deterministic and independent of request content:
/// `X-XSS-Protection`, `X-Content-Type-Options` and `X-Frame-Options` always,
/// `Strict-Transport-Security` only when `production`, and a collapsed
/// `Content-Security-Policy` always.
pub fn compose(production: bool) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ];

    if production {
        headers.push((
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ));
    }

    let csp = collapse_whitespace(CSP_TEMPLATE);
    // The template is static ASCII; collapsing cannot introduce an invalid byte.
    let csp = HeaderValue::from_str(&csp).expect("static CSP template is a valid header value");
    headers.push((CONTENT_SECURITY_POLICY, csp));

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of<'a>(
        headers: &'a [(HeaderName, HeaderValue)],
        name: &HeaderName,
    ) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.to_str().unwrap())
    }

    #[test]
    fn fixed_headers_always_present() {
        let headers = compose(false);
        assert_eq!(
            value_of(&headers, &X_XSS_PROTECTION),
            Some("1; mode=block")
        );
        assert_eq!(value_of(&headers, &X_CONTENT_TYPE_OPTIONS), Some("nosniff"));
        assert_eq!(value_of(&headers, &X_FRAME_OPTIONS), Some("DENY"));
    }

    #[test]
    fn hsts_only_in_production() {
        assert_eq!(value_of(&compose(false), &STRICT_TRANSPORT_SECURITY), None);
        assert_eq!(
            value_of(&compose(true), &STRICT_TRANSPORT_SECURITY),
            Some("max-age=31536000; includeSubDomains")
        );
    }

    #[test]
    fn csp_is_single_line_and_collapsed() {
        let headers = compose(false);
        let csp = value_of(&headers, &CONTENT_SECURITY_POLICY).unwrap();

        assert!(!csp.contains('\n'));
        assert!(!csp.contains('\t'));
        assert!(!csp.contains("  "));
        assert!(!csp.starts_with(' '));
        assert!(!csp.ends_with(' '));
    }

    #[test]
    fn csp_matches_documented_directive_string() {
        let headers = compose(true);
        let csp = value_of(&headers, &CONTENT_SECURITY_POLICY).unwrap();
        assert_eq!(
            csp,
            "default-src 'self'; script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
             font-src 'self' https://fonts.gstatic.com; img-src 'self' data: https:; \
             connect-src 'self'; frame-ancestors 'none'"
        );
    }

    #[test]
    fn collapse_squashes_arbitrary_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\t b \r\n  c  "), "a b c");
    }
}
