//! Outbound HTTP transport shared by every wrapper.
//!
//! A wrapper never picks a client itself: it asks [`HttpTransport::route`]
//! for each URL, and the configured [`TransportPolicy`] decides whether that
//! URL goes through the forward proxy.

use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Proxy};
use tributary_core::{NetworkConfig, ProxyConfig, ProxyRule};
use url::Url;

use crate::errors::WrapperError;

/// Query keys whose values never reach the logs.
const SENSITIVE_QUERY_KEYS: &[&str] = &["apikey", "api_key", "token", "password", "passkey", "key"];

/// Per-URL routing decision and log redaction.
pub trait TransportPolicy: Send + Sync + fmt::Debug {
    /// Whether `url` should be sent through the forward proxy.
    fn should_proxy(&self, url: &Url) -> bool;

    /// Form of `url` that is safe to write to logs.
    fn loggable_url(&self, url: &Url) -> String {
        sanitize_url(url)
    }
}

/// Strips userinfo and credential-like query values from `url`.
pub fn sanitize_url(url: &Url) -> String {
    let mut clean = url.clone();
    // Fails only for cannot-be-a-base URLs, which carry no userinfo.
    let _ = clean.set_username("");
    let _ = clean.set_password(None);

    let is_sensitive = |key: &str| SENSITIVE_QUERY_KEYS.contains(&key.to_ascii_lowercase().as_str());

    if url.query_pairs().any(|(key, _)| is_sensitive(&key)) {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| {
                let value = if is_sensitive(&key) {
                    "REDACTED".to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }

    clean.to_string()
}

/// Host-rule based proxy policy built from [`ProxyConfig`].
///
/// Without a proxy URL nothing is proxied. Otherwise the last matching rule
/// decides, and hosts no rule matches are proxied.
#[derive(Debug, Clone, Default)]
pub struct ProxyRules {
    enabled: bool,
    rules: Vec<ProxyRule>,
}

impl ProxyRules {
    /// Creates a policy from proxy configuration.
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            enabled: config.url.is_some(),
            rules: config.rules.clone(),
        }
    }
}

impl TransportPolicy for ProxyRules {
    fn should_proxy(&self, url: &Url) -> bool {
        if !self.enabled {
            return false;
        }

        let Some(host) = url.host_str() else {
            return true;
        };

        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(host))
            .is_none_or(|rule| rule.proxied)
    }
}

/// Client picked for a single request.
#[derive(Debug)]
pub struct Route<'a> {
    /// Client to send the request with
    pub client: &'a Client,
    /// Whether `client` is the proxied one
    pub proxied: bool,
}

/// Direct and proxied HTTP clients plus the policy choosing between them.
///
/// Cheap to clone; clones share connection pools.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    direct: Client,
    proxied: Option<Client>,
    policy: Arc<dyn TransportPolicy>,
}

impl HttpTransport {
    /// Builds both clients and a [`ProxyRules`] policy from configuration.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Proxy URL is invalid or a client cannot be built
    pub fn from_config(network: &NetworkConfig, proxy: &ProxyConfig) -> Result<Self, WrapperError> {
        let direct = Self::client_builder(network)
            .build()
            .map_err(|e| WrapperError::Configuration {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        let proxied = match &proxy.url {
            Some(proxy_url) => {
                let redacted = Url::parse(proxy_url)
                    .map(|url| sanitize_url(&url))
                    .unwrap_or_else(|_| "<unparseable>".to_string());
                let proxy = Proxy::all(proxy_url).map_err(|e| WrapperError::Configuration {
                    reason: format!("Invalid proxy URL {redacted}: {e}"),
                })?;
                let client = Self::client_builder(network).proxy(proxy).build().map_err(|e| {
                    WrapperError::Configuration {
                        reason: format!("Failed to build proxied HTTP client: {e}"),
                    }
                })?;
                tracing::debug!("Proxied HTTP client initialized for {redacted}");
                Some(client)
            }
            None => None,
        };

        Ok(Self::with_policy(
            direct,
            proxied,
            Arc::new(ProxyRules::from_config(proxy)),
        ))
    }

    /// Assembles a transport from existing clients and a custom policy.
    pub fn with_policy(
        direct: Client,
        proxied: Option<Client>,
        policy: Arc<dyn TransportPolicy>,
    ) -> Self {
        Self {
            direct,
            proxied,
            policy,
        }
    }

    /// Picks the client for `url`. The policy is consulted on every call.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Policy asked for a proxy but none is configured
    pub fn route(&self, url: &Url) -> Result<Route<'_>, WrapperError> {
        if !self.policy.should_proxy(url) {
            return Ok(Route {
                client: &self.direct,
                proxied: false,
            });
        }

        match &self.proxied {
            Some(client) => Ok(Route {
                client,
                proxied: true,
            }),
            None => Err(WrapperError::Configuration {
                reason: format!(
                    "Proxy requested for {} but no proxy is configured",
                    self.loggable_url(url)
                ),
            }),
        }
    }

    /// Redacted form of `url` for log lines.
    pub fn loggable_url(&self, url: &Url) -> String {
        self.policy.loggable_url(url)
    }

    /// Environment proxies are ignored; only [`ProxyConfig`] decides.
    fn client_builder(network: &NetworkConfig) -> reqwest::ClientBuilder {
        Client::builder()
            .no_proxy()
            .user_agent(network.user_agent)
            .connect_timeout(network.connect_timeout)
    }
}
