//! Security subsystem: the decision components of the request gate.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → classifier.rs (is this path subject to limiting?)
//!     → client_key.rs (who is the caller?)
//!     → rate_limit.rs (allow or deny at this instant)
//!
//! Outgoing response:
//!     → headers.rs (protective headers, composed once per process)
//! ```
//!
//! # Design Decisions
//! - Every decision is in-memory and synchronous; no I/O on the gating path
//! - All policy is constructor-injected from validated config, never ambient
//! - Denial is a routine outcome with a defined response, never a fault

pub mod classifier;
pub mod client_key;
pub mod headers;
pub mod rate_limit;

pub use classifier::PathClassifier;
pub use rate_limit::{FixedWindowLimiter, RateLimitPolicy};
