//! Path classification: which requests are subject to rate limiting.

/// Maps a request path to a limiting policy based on configured prefixes.
///
/// Paths under any configured prefix (API and auth entry points by default)
/// are subject to limiting; everything else is exempt. The prefix set is
/// configuration, not hard-coded logic, so deployments can widen or narrow
/// the gated surface.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    limited_prefixes: Vec<String>,
}

impl PathClassifier {
    pub fn new(limited_prefixes: Vec<String>) -> Self {
        Self { limited_prefixes }
    }

    /// True if requests to `path` must pass the rate limiter.
    pub fn is_limited(&self, path: &str) -> bool {
        self.limited_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
