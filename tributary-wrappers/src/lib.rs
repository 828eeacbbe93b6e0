//! Tributary Wrappers - Indexer and addon adapters

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Each wrapper turns a stream request into one outbound query and maps the
//! answer into Tributary streams. Result collection parses those streams and
//! folds failures into per-addon error lists.

pub mod context;
pub mod errors;
pub mod transport;
pub mod types;
pub mod wrappers;

// Re-export main types
pub use context::WrapperContext;
pub use errors::WrapperError;
pub use transport::{HttpTransport, ProxyRules, TransportPolicy, sanitize_url};
pub use types::{AddonInfo, AddonResults, ParsedStream, StreamKind, VideoQuality};
pub use wrappers::{
    ProwlarrAdapter, ProwlarrOptions, StreamSource, collect_parsed_streams, get_prowlarr_streams,
};

/// Convenience type alias for Results with WrapperError.
pub type Result<T> = std::result::Result<T, WrapperError>;
