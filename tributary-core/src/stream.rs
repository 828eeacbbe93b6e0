//! Request and stream types shared by every wrapper.

use serde::{Deserialize, Serialize};

/// Media type classification carried by a stream request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Series,
    Other,
}

/// What the caller is looking for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamRequest {
    /// Identifier passed to indexers as the search term
    pub id: String,
    #[serde(rename = "type", default)]
    pub media_type: MediaType,
}

impl StreamRequest {
    /// Creates a movie request for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_type: MediaType::Movie,
        }
    }
}

/// Per-user settings forwarded by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Address of the client that originated the request, forwarded verbatim
    pub requesting_ip: Option<String>,
}

/// Stream record produced by a wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: String,
    pub behavior_hints: BehaviorHints,
}

/// Hints that help players pick and label a stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_serializes_camel_case_without_absent_fields() {
        let stream = Stream {
            url: None,
            info_hash: Some("abc".to_string()),
            name: Some("Movie".to_string()),
            description: "Movie\n🌐 Indexer".to_string(),
            behavior_hints: BehaviorHints {
                filename: Some("Movie".to_string()),
                video_size: None,
            },
        };

        let json = serde_json::to_value(&stream).unwrap();

        assert_eq!(json["infoHash"], "abc");
        assert!(json.get("url").is_none());
        assert_eq!(json["behaviorHints"]["filename"], "Movie");
        assert!(json["behaviorHints"].get("videoSize").is_none());
    }

    #[test]
    fn test_request_type_defaults_to_movie() {
        let request: StreamRequest = serde_json::from_str(r#"{"id":"tt0133093"}"#).unwrap();
        assert_eq!(request.media_type, MediaType::Movie);

        let request: StreamRequest =
            serde_json::from_str(r#"{"id":"tt0903747:1:1","type":"series"}"#).unwrap();
        assert_eq!(request.media_type, MediaType::Series);
    }

    #[test]
    fn test_user_config_parses_requesting_ip() {
        let config: UserConfig = serde_json::from_str(r#"{"requestingIp":"203.0.113.7"}"#).unwrap();
        assert_eq!(config.requesting_ip.as_deref(), Some("203.0.113.7"));

        let config: UserConfig =
            serde_json::from_str(r#"{"requestingIp":"2001:DB8:0:0:0:0:0:1"}"#).unwrap();
        assert_eq!(config.requesting_ip.as_deref(), Some("2001:DB8:0:0:0:0:0:1"));

        let config: UserConfig =
            serde_json::from_str(r#"{"requestingIp":"203.0.113.7, 10.0.0.1"}"#).unwrap();
        assert_eq!(config.requesting_ip.as_deref(), Some("203.0.113.7, 10.0.0.1"));
    }
}
