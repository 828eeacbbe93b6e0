//! Centralized configuration for Tributary.
//!
//! Defaults for every wrapper live here so adapters never hard-code
//! endpoints, timeouts or proxy settings.

use std::str::FromStr;
use std::time::Duration;

/// Errors raised while interpreting configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A proxy rule did not have the `pattern:true|false` shape.
    #[error("Invalid proxy rule '{rule}': {reason}")]
    InvalidProxyRule {
        /// The rule text as supplied
        rule: String,
        /// Why the rule was rejected
        reason: String,
    },
}

/// Central configuration for all Tributary components.
///
/// Groups related settings into sections. Supports environment variable
/// overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct TributaryConfig {
    pub prowlarr: ProwlarrConfig,
    pub proxy: ProxyConfig,
    pub network: NetworkConfig,
}

/// Defaults applied to Prowlarr wrappers when the caller leaves them out.
#[derive(Debug, Clone)]
pub struct ProwlarrConfig {
    /// Endpoint used when no override URL is supplied
    pub default_url: String,
    /// Request timeout used when no override is supplied
    pub default_timeout: Duration,
    /// Fixed page size sent as the `limit` parameter
    pub search_limit: u32,
    /// Display name used when no override name is supplied
    pub default_name: String,
}

impl Default for ProwlarrConfig {
    fn default() -> Self {
        Self {
            default_url: "http://localhost:9696".to_string(),
            default_timeout: Duration::from_millis(7000),
            search_limit: 100,
            default_name: "Prowlarr".to_string(),
        }
    }
}

/// Forward proxy used for outbound addon requests.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Proxy URL; `None` disables proxying entirely
    pub url: Option<String>,
    /// Per-host rules, evaluated in order, last match wins
    pub rules: Vec<ProxyRule>,
}

/// Single `pattern:enabled` proxy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    /// `*`, `*.domain` or an exact host name (stored lower-case)
    pub pattern: String,
    /// Whether matching hosts go through the proxy
    pub proxied: bool,
}

impl ProxyRule {
    /// Checks whether the rule applies to `host`.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        if self.pattern == "*" {
            return true;
        }
        match self.pattern.strip_prefix("*.") {
            Some(domain) => host == domain || host.ends_with(&format!(".{domain}")),
            None => host == self.pattern,
        }
    }
}

impl FromStr for ProxyRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidProxyRule {
            rule: s.to_string(),
            reason: reason.to_string(),
        };

        let (pattern, enabled) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected pattern:true or pattern:false"))?;

        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern.is_empty() {
            return Err(invalid("empty host pattern"));
        }

        let proxied = match enabled.trim() {
            "true" => true,
            "false" => false,
            _ => return Err(invalid("flag must be true or false")),
        };

        Ok(Self { pattern, proxied })
    }
}

impl ProxyConfig {
    /// Parses a comma-separated rule list such as `*:false,indexer.lan:true`.
    ///
    /// # Errors
    /// - `ConfigError::InvalidProxyRule` - A rule is malformed
    pub fn parse_rules(spec: &str) -> Result<Vec<ProxyRule>, ConfigError> {
        spec.split(',')
            .filter(|rule| !rule.trim().is_empty())
            .map(ProxyRule::from_str)
            .collect()
    }
}

/// Client-level HTTP settings shared by every wrapper.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// User agent for outbound requests
    pub user_agent: &'static str,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: "tributary/0.1.0",
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TributaryConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("TRIBUTARY_PROWLARR_URL").filter(|url| !url.is_empty()) {
            config.prowlarr.default_url = url;
        }

        if let Some(timeout) = lookup("TRIBUTARY_PROWLARR_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(millis) if millis > 0 => {
                    config.prowlarr.default_timeout = Duration::from_millis(millis);
                }
                _ => tracing::warn!("Ignoring invalid TRIBUTARY_PROWLARR_TIMEOUT_MS: {timeout}"),
            }
        }

        if let Some(timeout) = lookup("TRIBUTARY_CONNECT_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(millis) => config.network.connect_timeout = Duration::from_millis(millis),
                Err(_) => tracing::warn!("Ignoring invalid TRIBUTARY_CONNECT_TIMEOUT_MS: {timeout}"),
            }
        }

        config.proxy.url = lookup("TRIBUTARY_ADDON_PROXY").filter(|url| !url.is_empty());

        if let Some(rules) = lookup("TRIBUTARY_ADDON_PROXY_CONFIG") {
            match ProxyConfig::parse_rules(&rules) {
                Ok(rules) => config.proxy.rules = rules,
                Err(e) => tracing::warn!("Ignoring TRIBUTARY_ADDON_PROXY_CONFIG: {e}"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = TributaryConfig::default();

        assert_eq!(config.prowlarr.default_url, "http://localhost:9696");
        assert_eq!(config.prowlarr.default_timeout, Duration::from_millis(7000));
        assert_eq!(config.prowlarr.search_limit, 100);
        assert_eq!(config.prowlarr.default_name, "Prowlarr");
        assert!(config.proxy.url.is_none());
        assert!(config.proxy.rules.is_empty());
    }

    #[test]
    fn test_env_override() {
        let config = TributaryConfig::from_lookup(lookup_from(&[
            ("TRIBUTARY_PROWLARR_URL", "http://prowlarr.lan:9696/"),
            ("TRIBUTARY_PROWLARR_TIMEOUT_MS", "2500"),
            ("TRIBUTARY_ADDON_PROXY", "http://proxy.lan:3128"),
            ("TRIBUTARY_ADDON_PROXY_CONFIG", "*:false, prowlarr.lan:true"),
        ]));

        assert_eq!(config.prowlarr.default_url, "http://prowlarr.lan:9696/");
        assert_eq!(config.prowlarr.default_timeout, Duration::from_millis(2500));
        assert_eq!(config.proxy.url.as_deref(), Some("http://proxy.lan:3128"));
        assert_eq!(config.proxy.rules.len(), 2);
        assert!(config.proxy.rules[1].proxied);
    }

    #[test]
    fn test_invalid_env_values_keep_defaults() {
        let config = TributaryConfig::from_lookup(lookup_from(&[
            ("TRIBUTARY_PROWLARR_TIMEOUT_MS", "soon"),
            ("TRIBUTARY_ADDON_PROXY", ""),
            ("TRIBUTARY_ADDON_PROXY_CONFIG", "host-without-flag"),
        ]));

        assert_eq!(config.prowlarr.default_timeout, Duration::from_millis(7000));
        assert!(config.proxy.url.is_none());
        assert!(config.proxy.rules.is_empty());
    }

    #[test]
    fn test_proxy_rule_matching() {
        let wildcard: ProxyRule = "*.example.com:true".parse().unwrap();
        assert!(wildcard.matches("example.com"));
        assert!(wildcard.matches("Indexer.Example.com"));
        assert!(!wildcard.matches("notexample.com"));

        let exact: ProxyRule = "prowlarr.lan:false".parse().unwrap();
        assert!(exact.matches("prowlarr.lan"));
        assert!(!exact.proxied);
        assert!(!exact.matches("other.lan"));
    }

    #[test]
    fn test_proxy_rule_rejects_bad_flag() {
        assert!("host:maybe".parse::<ProxyRule>().is_err());
        assert!(":true".parse::<ProxyRule>().is_err());
    }
}
