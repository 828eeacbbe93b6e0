//! Prowlarr indexer wrapper.
//!
//! Sends one search to a Prowlarr instance and maps every release it returns
//! to a [`Stream`]. No retries, no paging beyond a single page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tributary_core::{BehaviorHints, Stream, StreamRequest, UserConfig};
use url::Url;

use super::{StreamSource, collect_parsed_streams};
use crate::context::WrapperContext;
use crate::errors::WrapperError;
use crate::transport::HttpTransport;
use crate::types::{AddonResults, INDEXER_MARKER, SEEDERS_MARKER};

const SEARCH_PATH: [&str; 3] = ["api", "v1", "search"];
const API_KEY_HEADER: &str = "x-api-key";
const CLIENT_IP_HEADERS: [&str; 3] = ["x-client-ip", "x-forwarded-for", "x-real-ip"];

/// Connection settings for one Prowlarr instance.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    base_url: String,
    api_key: String,
    name: String,
    addon_id: String,
    timeout: Duration,
    search_limit: u32,
    user: UserConfig,
}

impl ConnectionConfig {
    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout applied to each query.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Caller-supplied overrides for [`get_prowlarr_streams`].
#[derive(Debug, Clone, Default)]
pub struct ProwlarrOptions {
    /// Endpoint override
    pub url: Option<String>,
    /// API key, required
    pub api_key: String,
    /// Display name override
    pub name: Option<String>,
    /// Timeout override in milliseconds, as text
    pub timeout: Option<String>,
}

/// Release as returned by `GET /api/v1/search`.
///
/// Fields with an unexpected type are read as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrRelease {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    magnet_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    info_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    size: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    seeders: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "lenient")]
    indexer: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

impl ProwlarrRelease {
    fn into_stream(self) -> Stream {
        let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());

        let mut description = format!(
            "{}\n{} {}",
            self.title.as_deref().unwrap_or_default(),
            INDEXER_MARKER,
            self.indexer.as_deref().unwrap_or_default()
        );
        // Zero seeders is treated like no count at all.
        if let Some(seeders) = self.seeders.filter(|seeders| seeders.as_f64() != Some(0.0)) {
            description.push_str(&format!("\n{SEEDERS_MARKER} {seeders}"));
        }

        Stream {
            url: non_empty(self.magnet_url).or_else(|| non_empty(self.download_url)),
            info_hash: non_empty(self.info_hash),
            name: self.title.clone(),
            description,
            behavior_hints: BehaviorHints {
                filename: self.title,
                video_size: self.size,
            },
        }
    }
}

/// Strips trailing slashes so paths can be appended safely.
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Prowlarr search adapter.
#[derive(Debug, Clone)]
pub struct ProwlarrAdapter {
    connection: ConnectionConfig,
    transport: HttpTransport,
}

impl ProwlarrAdapter {
    /// Creates an adapter; absent overrides fall back to the context defaults.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Endpoint is not an absolute http(s) URL
    pub fn new(
        api_key: impl Into<String>,
        override_url: Option<&str>,
        name: Option<&str>,
        addon_id: impl Into<String>,
        user: UserConfig,
        timeout: Option<Duration>,
        context: &WrapperContext,
    ) -> Result<Self, WrapperError> {
        let defaults = &context.settings.prowlarr;
        let base_url = override_url.unwrap_or(defaults.default_url.as_str());
        let connection = ConnectionConfig {
            base_url: Self::validate_base_url(base_url)?,
            api_key: api_key.into(),
            name: name.unwrap_or(defaults.default_name.as_str()).to_string(),
            addon_id: addon_id.into(),
            timeout: timeout.unwrap_or(defaults.default_timeout),
            search_limit: defaults.search_limit,
            user,
        };

        Ok(Self {
            connection,
            transport: context.transport.clone(),
        })
    }

    /// Returns a copy pointed at `url`, normalized the same way as at construction.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Endpoint is not an absolute http(s) URL
    pub fn with_base_url(mut self, url: &str) -> Result<Self, WrapperError> {
        self.connection.base_url = Self::validate_base_url(url)?;
        Ok(self)
    }

    /// Connection settings in use.
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    fn validate_base_url(url: &str) -> Result<String, WrapperError> {
        let normalized = normalize_base_url(url.trim());
        match Url::parse(&normalized) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(normalized),
            Ok(parsed) => Err(WrapperError::Configuration {
                reason: format!("Unsupported Prowlarr URL scheme: {}", parsed.scheme()),
            }),
            Err(e) => Err(WrapperError::Configuration {
                reason: format!("Invalid Prowlarr URL: {e}"),
            }),
        }
    }

    /// Search URL for `query`, keeping any path prefix of the base URL.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - Base URL cannot carry a path
    pub fn search_url(&self, query: &str) -> Result<Url, WrapperError> {
        let invalid = |reason: String| WrapperError::Configuration { reason };

        let mut url = Url::parse(&self.connection.base_url)
            .map_err(|e| invalid(format!("Invalid Prowlarr URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| invalid(format!("Prowlarr URL cannot be a base: {}", self.connection.base_url)))?
            .pop_if_empty()
            .extend(SEARCH_PATH);
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &self.connection.search_limit.to_string());

        Ok(url)
    }

    /// Headers sent with every search.
    ///
    /// # Errors
    /// - `WrapperError::Configuration` - API key is not a valid header value
    pub fn search_headers(&self) -> Result<HeaderMap, WrapperError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&self.connection.api_key).map_err(|_| {
            WrapperError::Configuration {
                reason: "Prowlarr API key contains characters not allowed in a header".to_string(),
            }
        })?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let requesting_ip = self.connection.user.requesting_ip.as_deref();
        if let Some(ip) = requesting_ip.filter(|ip| !ip.is_empty()) {
            let value = HeaderValue::from_str(ip).map_err(|_| {
                WrapperError::Configuration {
                    reason: format!("Requesting IP {ip} is not a valid header value"),
                }
            })?;
            for name in CLIENT_IP_HEADERS {
                headers.insert(HeaderName::from_static(name), value.clone());
            }
        }

        Ok(headers)
    }

    fn query_failed(&self, reason: String, status: Option<u16>) -> WrapperError {
        WrapperError::QueryFailed {
            addon: self.connection.name.clone(),
            reason,
            status,
        }
    }

    /// Sends the request and returns the success body, or a `QueryFailed`.
    async fn exchange(
        &self,
        client: &reqwest::Client,
        url: Url,
        headers: HeaderMap,
    ) -> Result<String, WrapperError> {
        let response = client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.query_failed(format!("Request failed: {e}"), None))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            self.query_failed(format!("Failed to read response body: {e}"), Some(status.as_u16()))
        })?;

        if !status.is_success() {
            return Err(self.query_failed(
                format!(
                    "{} - {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    body
                ),
                Some(status.as_u16()),
            ));
        }

        Ok(body)
    }

    /// Parses a search response body into streams, one per release.
    ///
    /// # Errors
    /// - `WrapperError::Deserialization` - Body is not a JSON array
    pub fn parse_releases(&self, body: &str) -> Result<Vec<Stream>, WrapperError> {
        let elements: Vec<serde_json::Value> =
            serde_json::from_str(body).map_err(|e| WrapperError::Deserialization {
                addon: self.connection.name.clone(),
                reason: format!("Expected a JSON array of releases: {e}"),
            })?;

        Ok(elements
            .into_iter()
            .map(|element| {
                serde_json::from_value::<ProwlarrRelease>(element)
                    .unwrap_or_default()
                    .into_stream()
            })
            .collect())
    }
}

#[async_trait]
impl StreamSource for ProwlarrAdapter {
    fn addon_name(&self) -> &str {
        &self.connection.name
    }

    fn addon_id(&self) -> &str {
        &self.connection.addon_id
    }

    async fn fetch_streams(&self, request: &StreamRequest) -> Result<Vec<Stream>, WrapperError> {
        let url = self.search_url(&request.id)?;
        let headers = self.search_headers()?;
        let route = self.transport.route(&url)?;

        tracing::info!(
            "Making a {} request to {} ({})",
            if route.proxied { "proxied" } else { "direct" },
            self.connection.name,
            self.transport.loggable_url(&url)
        );

        let timeout = self.connection.timeout;
        let body = tokio::time::timeout(timeout, self.exchange(route.client, url, headers))
            .await
            .map_err(|_| {
                self.query_failed(
                    format!("Request timed out after {}ms", timeout.as_millis()),
                    None,
                )
            })??;

        self.parse_releases(&body)
    }
}

/// Reads a millisecond timeout override; anything but a positive integer means "use the default".
fn parse_timeout(timeout: Option<&str>) -> Option<Duration> {
    let text = timeout?.trim();
    match text.parse::<u64>() {
        Ok(millis) if millis > 0 => Some(Duration::from_millis(millis)),
        _ => {
            tracing::debug!("Ignoring Prowlarr timeout override '{text}'");
            None
        }
    }
}

/// Queries Prowlarr for `request` and collects parsed streams and errors.
///
/// # Errors
/// - `WrapperError::Configuration` - API key missing or endpoint invalid;
///   raised before any network activity
pub async fn get_prowlarr_streams(
    config: &UserConfig,
    options: ProwlarrOptions,
    request: &StreamRequest,
    addon_id: &str,
    context: &WrapperContext,
) -> Result<AddonResults, WrapperError> {
    if options.api_key.is_empty() {
        return Err(WrapperError::Configuration {
            reason: "Missing API key for Prowlarr".to_string(),
        });
    }

    let adapter = ProwlarrAdapter::new(
        options.api_key,
        options.url.as_deref(),
        options.name.as_deref(),
        addon_id,
        config.clone(),
        parse_timeout(options.timeout.as_deref()),
        context,
    )?;

    Ok(collect_parsed_streams(&adapter, request).await)
}
