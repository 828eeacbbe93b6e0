//! Mock source implementation for testing.

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use tributary_core::{Stream, StreamRequest};

#[cfg(test)]
use super::StreamSource;
#[cfg(test)]
use crate::errors::WrapperError;

/// Mock source for testing. Returns canned streams or a canned error once.
#[cfg(test)]
#[derive(Debug)]
pub struct MockSource {
    outcome: Mutex<Option<Result<Vec<Stream>, WrapperError>>>,
}

#[cfg(test)]
impl MockSource {
    /// Creates a source that returns `streams`.
    pub fn with_streams(streams: Vec<Stream>) -> Self {
        Self {
            outcome: Mutex::new(Some(Ok(streams))),
        }
    }

    /// Creates a source that fails with `error`.
    pub fn failing(error: WrapperError) -> Self {
        Self {
            outcome: Mutex::new(Some(Err(error))),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl StreamSource for MockSource {
    fn addon_name(&self) -> &str {
        "Mock"
    }

    fn addon_id(&self) -> &str {
        "mock"
    }

    async fn fetch_streams(&self, _request: &StreamRequest) -> Result<Vec<Stream>, WrapperError> {
        self.outcome
            .lock()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
