//! Shared settings and transport handed to every wrapper invocation.

use tributary_core::TributaryConfig;

use crate::errors::WrapperError;
use crate::transport::HttpTransport;

/// Configuration defaults plus the HTTP transport wrappers send through.
///
/// Build once at startup and share; cloning is cheap.
#[derive(Debug, Clone)]
pub struct WrapperContext {
    /// Defaults for overrides the caller leaves out
    pub settings: TributaryConfig,
    /// Direct and proxied clients with their routing policy
    pub transport: HttpTransport,
}

impl WrapperContext {
    /// Builds the transport described by `settings`.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Proxy URL is invalid or a client cannot be built
    pub fn new(settings: TributaryConfig) -> Result<Self, WrapperError> {
        let transport = HttpTransport::from_config(&settings.network, &settings.proxy)?;
        Ok(Self {
            settings,
            transport,
        })
    }

    /// Uses an already-built transport, e.g. one with a custom policy.
    pub fn with_transport(settings: TributaryConfig, transport: HttpTransport) -> Self {
        Self {
            settings,
            transport,
        }
    }
}
