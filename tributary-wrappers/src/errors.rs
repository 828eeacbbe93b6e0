//! Error types for wrapper operations.

use thiserror::Error;

/// Errors that can occur while querying an addon or indexer.
#[derive(Debug, Error)]
pub enum WrapperError {
    /// Wrapper could not be set up; raised before any network activity.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What was wrong with the supplied settings
        reason: String,
    },

    /// Request failed in transport, timed out, or returned a non-success status.
    #[error("{addon} query failed: {reason}")]
    QueryFailed {
        /// Display name of the addon that was queried
        addon: String,
        /// Diagnostic text, including the response body for status failures
        reason: String,
        /// HTTP status code when the server answered
        status: Option<u16>,
    },

    /// Response body was not the expected JSON document.
    #[error("{addon} returned an unreadable response: {reason}")]
    Deserialization {
        /// Display name of the addon that was queried
        addon: String,
        /// The reason for the parse failure
        reason: String,
    },
}
