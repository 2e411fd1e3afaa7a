//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GateConfig (validated, immutable)
//!     → shared read-only by the server and middleware
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; policy never changes mid-process
//! - All fields have defaults to allow running with no config file at all
//! - Misconfiguration is fatal at startup: a silently-defaulted limit would
//!   weaken abuse protection without any operator signal

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClassifierConfig, GateConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    SecurityConfig,
};
