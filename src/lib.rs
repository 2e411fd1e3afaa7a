//! Request gate: rate limiting and security header enforcement for inbound
//! HTTP traffic.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                REQUEST GATE                   │
//!   Client         │  ┌────────────┐   ┌────────────┐             │
//!   Request ───────┼─▶│ classifier │──▶│ client key │             │
//!                  │  └────────────┘   └─────┬──────┘             │
//!                  │        exempt           │ limited            │
//!                  │          │        ┌─────▼──────┐   denied    │
//!                  │          │        │  limiter   │──────▶ 429  │
//!                  │          │        └─────┬──────┘             │
//!                  │          ▼              ▼ allowed            │
//!                  │   ┌─────────────────────────────┐            │
//!                  │   │   downstream handlers       │            │
//!                  │   └─────────────┬───────────────┘            │
//!   Client         │  ┌──────────────▼──────────────┐             │
//!   Response ◀─────┼──│ security header decoration  │             │
//!                  │  └─────────────────────────────┘             │
//!                  └──────────────────────────────────────────────┘
//! ```
//!
//! Authentication, session validation and UI concerns live elsewhere; the
//! gate only decides reject-or-forward and decorates whatever comes back.

// Core subsystems
pub mod config;
pub mod http;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use http::GateServer;
pub use lifecycle::Shutdown;
