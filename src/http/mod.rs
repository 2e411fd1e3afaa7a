//! HTTP subsystem: middleware orchestration and server assembly.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, ConnectInfo, ambient layers)
//!     → middleware.rs (classify → key → limit → forward or 429)
//!     → downstream handlers (external collaborator)
//!     → middleware.rs (decorate response with security headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::GateState;
pub use server::GateServer;
