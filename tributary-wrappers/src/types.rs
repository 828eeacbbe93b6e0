//! Parsed stream types produced by result collection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tributary_core::Stream;
use url::Url;

/// Description line marker carrying the indexer name.
pub const INDEXER_MARKER: &str = "🌐";
/// Description line marker carrying the seeder count.
pub const SEEDERS_MARKER: &str = "👥";

static RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(2160p|4k|uhd|1080p|720p|480p)\b").expect("resolution pattern is valid")
});

/// Streams and error messages gathered from one addon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonResults {
    /// Streams the addon returned, parsed
    pub addon_streams: Vec<ParsedStream>,
    /// Human readable failures, one per failed query
    pub addon_errors: Vec<String>,
}

/// Addon a parsed stream came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddonInfo {
    /// Display name
    pub name: String,
    /// Instance identifier
    pub id: String,
}

/// How a stream is delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Magnet link or info hash
    Torrent,
    /// Plain http(s) download
    Http,
    /// Neither could be determined
    Unknown,
}

/// Stream enriched with fields derived from its name and description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStream {
    /// Addon that produced the stream
    pub addon: AddonInfo,
    /// Release file name
    pub filename: Option<String>,
    /// Size in bytes
    pub size: Option<u64>,
    /// Video quality detected from the file name
    pub quality: VideoQuality,
    /// Indexer that listed the release
    pub indexer: Option<String>,
    /// Seeder count, when reported and non-zero
    pub seeders: Option<u32>,
    /// Lower-case hex info hash
    pub info_hash: Option<String>,
    /// Resolvable URL
    pub url: Option<String>,
    /// Delivery kind
    pub kind: StreamKind,
}

impl ParsedStream {
    /// Parses a raw stream from the addon described by `addon`.
    pub fn from_stream(stream: &Stream, addon: &AddonInfo) -> Self {
        let filename = stream
            .behavior_hints
            .filename
            .clone()
            .or_else(|| stream.name.clone())
            .filter(|name| !name.is_empty());

        let quality = filename
            .as_deref()
            .map(VideoQuality::from_release_name)
            .unwrap_or(VideoQuality::Unknown);

        let info_hash = stream
            .info_hash
            .as_deref()
            .map(str::to_ascii_lowercase)
            .or_else(|| stream.url.as_deref().and_then(info_hash_from_magnet));

        let kind = match stream.url.as_deref() {
            _ if info_hash.is_some() => StreamKind::Torrent,
            Some(url) if url.starts_with("magnet:") => StreamKind::Torrent,
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                StreamKind::Http
            }
            _ => StreamKind::Unknown,
        };

        Self {
            addon: addon.clone(),
            filename,
            size: stream.behavior_hints.video_size,
            quality,
            indexer: description_field(&stream.description, INDEXER_MARKER)
                .map(str::to_string),
            seeders: description_field(&stream.description, SEEDERS_MARKER)
                .and_then(|value| value.parse().ok())
                .filter(|seeders| *seeders > 0),
            info_hash,
            url: stream.url.clone(),
            kind,
        }
    }

    /// Format file size in human-readable format.
    pub fn format_size(&self) -> Option<String> {
        const GB: u64 = 1024 * 1024 * 1024;
        const MB: u64 = 1024 * 1024;

        self.size.map(|size| {
            if size >= GB {
                format!("{:.1} GB", size as f64 / GB as f64)
            } else if size >= MB {
                format!("{:.1} MB", size as f64 / MB as f64)
            } else {
                format!("{:.1} KB", size as f64 / 1024.0)
            }
        })
    }
}

/// Value of the first line after the title starting with `marker`, if non-empty.
fn description_field<'a>(description: &'a str, marker: &str) -> Option<&'a str> {
    description
        .lines()
        .skip(1)
        .find_map(|line| line.strip_prefix(marker))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Extracts a hex `btih` info hash from a magnet URI.
fn info_hash_from_magnet(magnet: &str) -> Option<String> {
    let url = Url::parse(magnet).ok()?;
    if url.scheme() != "magnet" {
        return None;
    }

    url.query_pairs()
        .filter(|(key, _)| key == "xt")
        .find_map(|(_, value)| {
            let hash = value.strip_prefix("urn:btih:")?;
            (hash.len() == 40 && hex::decode(hash).is_ok()).then(|| hash.to_ascii_lowercase())
        })
}

/// Video quality enumeration for parsed streams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VideoQuality {
    /// No recognizable marker
    Unknown,
    /// Camera recording
    CamRip,
    /// Standard definition
    Sd480p,
    /// 720p web download
    WebDl720p,
    /// 720p broadcast capture
    Hdtv720p,
    /// 720p Blu-ray encode
    BluRay720p,
    /// 1080p web download
    WebDl1080p,
    /// 1080p broadcast capture
    Hdtv1080p,
    /// 1080p Blu-ray encode
    BluRay1080p,
    /// 2160p release
    BluRay4K,
    /// Untouched disc remux
    Remux,
}

impl VideoQuality {
    /// Parse video quality from a release name.
    pub fn from_release_name(name: &str) -> Self {
        let name_upper = name.to_uppercase();

        if name_upper.contains("CAMRIP") || name_upper.contains("HDCAM") {
            return VideoQuality::CamRip;
        }
        if name_upper.contains("REMUX") {
            return VideoQuality::Remux;
        }

        let is_web = name_upper.contains("WEB");
        let is_hdtv = name_upper.contains("HDTV");

        let resolution = RESOLUTION
            .find(name)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default();

        match resolution.as_str() {
            "2160P" | "4K" | "UHD" => VideoQuality::BluRay4K,
            "1080P" if is_web => VideoQuality::WebDl1080p,
            "1080P" if is_hdtv => VideoQuality::Hdtv1080p,
            "1080P" => VideoQuality::BluRay1080p,
            "720P" if is_web => VideoQuality::WebDl720p,
            "720P" if is_hdtv => VideoQuality::Hdtv720p,
            "720P" => VideoQuality::BluRay720p,
            "480P" => VideoQuality::Sd480p,
            _ => VideoQuality::Unknown,
        }
    }
}
