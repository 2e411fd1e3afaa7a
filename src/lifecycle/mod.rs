//! Lifecycle management subsystem.
//!
//! Startup order: config first, then gate state, then listener. Shutdown is
//! signalled once and observed by the serve loop and background tasks.

pub mod shutdown;

pub use shutdown::Shutdown;
