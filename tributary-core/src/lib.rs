//! Tributary Core - Shared building blocks for stream wrappers
//!
//! Configuration defaults, the request and stream records every wrapper
//! speaks, and tracing initialization for binaries.

pub mod config;
pub mod stream;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ConfigError, NetworkConfig, ProwlarrConfig, ProxyConfig, ProxyRule, TributaryConfig};
pub use stream::{BehaviorHints, MediaType, Stream, StreamRequest, UserConfig};
