//! Wrapper implementations for stream sources.

use async_trait::async_trait;
use tributary_core::{Stream, StreamRequest};

use crate::errors::WrapperError;
use crate::types::{AddonInfo, AddonResults, ParsedStream};

pub mod mock;
pub mod prowlarr;

#[cfg(test)]
pub use mock::MockSource;
pub use prowlarr::{ProwlarrAdapter, ProwlarrOptions, get_prowlarr_streams};

/// Trait for anything that turns a stream request into streams.
///
/// Implementations own their connection settings; result collection only
/// needs the addon identity and the fetch operation.
#[async_trait]
pub trait StreamSource: Send + Sync + std::fmt::Debug {
    /// Display name used in logs and error messages.
    fn addon_name(&self) -> &str;

    /// Instance identifier.
    fn addon_id(&self) -> &str;

    /// Fetch streams for `request`.
    ///
    /// # Errors
    /// - `WrapperError::QueryFailed` - Transport failure, timeout or error status
    /// - `WrapperError::Deserialization` - Response body could not be parsed
    /// - `WrapperError::Configuration` - Source is misconfigured
    async fn fetch_streams(&self, request: &StreamRequest) -> Result<Vec<Stream>, WrapperError>;
}

/// Runs `source` once and parses whatever it returns.
///
/// Failures are logged and reported in `addon_errors` instead of being
/// returned, so one broken addon cannot fail a whole aggregation.
pub async fn collect_parsed_streams(
    source: &dyn StreamSource,
    request: &StreamRequest,
) -> AddonResults {
    let addon = AddonInfo {
        name: source.addon_name().to_string(),
        id: source.addon_id().to_string(),
    };

    match source.fetch_streams(request).await {
        Ok(streams) => {
            tracing::debug!(
                "{} returned {} streams for {}",
                addon.name,
                streams.len(),
                request.id
            );
            AddonResults {
                addon_streams: streams
                    .iter()
                    .map(|stream| ParsedStream::from_stream(stream, &addon))
                    .collect(),
                addon_errors: Vec::new(),
            }
        }
        Err(e) => {
            tracing::error!("Failed to get streams from {}: {}", addon.name, e);
            AddonResults {
                addon_streams: Vec::new(),
                addon_errors: vec![format!("{}: {}", addon.name, e)],
            }
        }
    }
}
