//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the client key and path ride along as
//!   fields on every gate decision worth logging
//! - Metrics are cheap atomic increments, safe on the per-request hot path
//! - Denials log at warn (operator-relevant), fallback-key extraction at
//!   debug (diagnostic)

pub mod metrics;
