//! Per-client fixed-window rate limiting.
//!
//! # Responsibilities
//! - Track request counts per client key within fixed time windows
//! - Answer allow/deny for a key at a given instant
//! - Bound memory via a background sweep of expired entries
//!
//! # Design Decisions
//! - Fixed window, not token bucket or sliding window: counts reset entirely
//!   at window boundaries. A client can burst up to the cap at the start of
//!   each window, and a client denied near the end of a window regains full
//!   quota the instant the next window opens. Callers must not assume smooth
//!   rate shaping.
//! - Strict cap: a denied request is not counted, so the denial decision is
//!   stable until the window resets and the counter never grows past the cap.
//! - `now` is an explicit parameter, letting tests drive the clock without
//!   sleeping.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::observability::metrics;

/// Immutable limiting policy, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Maximum requests allowed per key within one window.
    pub max_requests: u32,

    /// Length of each fixed window.
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Window length in whole seconds, as emitted in `Retry-After`.
    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }
}

/// Counter state for one client key.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_end: Instant,
}

impl WindowEntry {
    /// Open a fresh window at `now`, counting the current request.
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            window_end: now + window,
        }
    }

    /// An entry observed past its window end is stale and must never be read
    /// as live state.
    fn expired(&self, now: Instant) -> bool {
        now > self.window_end
    }
}

/// Keyed fixed-window limiter.
///
/// Owns the key-to-entry map exclusively; no other component reads or
/// mutates entries. The map is sharded ([`DashMap`]) and the entry API holds
/// the shard lock across the read-check-write of a single entry, so two
/// concurrent requests for the same key can never both slip under the cap.
/// The critical section is map lookup plus compare plus mutate only; callers
/// must not hold any reference into the map across an await point.
pub struct FixedWindowLimiter {
    entries: DashMap<String, WindowEntry>,
    policy: RateLimitPolicy,
}

impl FixedWindowLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Decide whether a request from `key` at `now` is allowed, recording it
    /// if so. Never fails; denial is a routine outcome, not an error.
    pub fn allow(&self, key: &str, now: Instant) -> bool {
        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(WindowEntry::open(now, self.policy.window));
                true
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.expired(now) {
                    // Lazy replacement: the stale counter belongs to a dead
                    // window, so only the current request counts.
                    *entry = WindowEntry::open(now, self.policy.window);
                    true
                } else if entry.count < self.policy.max_requests {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Drop entries whose window ended more than `grace` before `now`.
    ///
    /// Correctness never depends on sweeping (stale entries are replaced
    /// lazily on access); this only bounds memory under high key cardinality.
    pub fn sweep(&self, now: Instant, grace: Duration) {
        self.entries
            .retain(|_, entry| now <= entry.window_end + grace);
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

/// Run the sweep loop until the shutdown signal fires.
///
/// Spawned by the server alongside the listener; interval and grace come
/// from config.
pub async fn run_sweeper(
    limiter: std::sync::Arc<FixedWindowLimiter>,
    interval: Duration,
    grace: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let before = limiter.tracked_keys();
                limiter.sweep(Instant::now(), grace);
                let after = limiter.tracked_keys();
                metrics::record_tracked_keys(after);
                if after < before {
                    tracing::debug!(
                        evicted = before - after,
                        tracked = after,
                        "Swept expired rate limit entries"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Rate limit sweeper stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn limiter(max: u32, window_ms: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitPolicy {
            max_requests: max,
            window: Duration::from_millis(window_ms),
        })
    }

    #[test]
    fn allows_up_to_cap_then_denies() {
        let l = limiter(3, 60_000);
        let now = Instant::now();

        assert!(l.allow("1.2.3.4", now));
        assert!(l.allow("1.2.3.4", now));
        assert!(l.allow("1.2.3.4", now));
        assert!(!l.allow("1.2.3.4", now));
        // Strict cap: repeated denials stay denials, the count is frozen.
        assert!(!l.allow("1.2.3.4", now));
    }

    #[test]
    fn window_expiry_resets_count() {
        let l = limiter(3, 60_000);
        let start = Instant::now();

        for _ in 0..4 {
            l.allow("1.2.3.4", start);
        }
        assert!(!l.allow("1.2.3.4", start));

        // Just past the window boundary the key gets a fresh quota...
        let later = start + Duration::from_millis(60_001);
        assert!(l.allow("1.2.3.4", later));
        // ...of which the resetting request itself consumed one slot.
        assert!(l.allow("1.2.3.4", later));
        assert!(l.allow("1.2.3.4", later));
        assert!(!l.allow("1.2.3.4", later));
    }

    #[test]
    fn observation_at_exact_window_end_is_still_live() {
        let l = limiter(1, 60_000);
        let start = Instant::now();

        assert!(l.allow("k", start));
        // Staleness requires now > window_end; equality is inside the window.
        assert!(!l.allow("k", start + Duration::from_millis(60_000)));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let l = limiter(2, 60_000);
        let now = Instant::now();

        assert!(l.allow("a", now));
        assert!(l.allow("a", now));
        assert!(!l.allow("a", now));

        assert!(l.allow("b", now));
        assert!(l.allow("b", now));
    }

    #[test]
    fn concurrent_requests_never_exceed_cap() {
        let l = Arc::new(limiter(50, 60_000));
        let allowed = Arc::new(AtomicU32::new(0));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let l = l.clone();
                let allowed = allowed.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if l.allow("shared", now) {
                            allowed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(allowed.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn sweep_evicts_only_entries_past_grace() {
        let l = limiter(10, 1_000);
        let start = Instant::now();

        l.allow("old", start);
        let late = start + Duration::from_millis(5_000);
        l.allow("fresh", late);
        assert_eq!(l.tracked_keys(), 2);

        l.sweep(late, Duration::from_millis(2_000));
        assert_eq!(l.tracked_keys(), 1);
        assert!(l.allow("fresh", late));
    }
}
