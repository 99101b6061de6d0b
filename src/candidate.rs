//! Core data model: candidates produced by extractors and the
//! normalized result the resolver hands back to callers.

use serde::{Deserialize, Serialize};

/// What kind of media a candidate URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// HLS playlist (`.m3u8`).
    Hls,
    /// Progressive download (`.mp4` and friends).
    Progressive,
    /// Embeddable player page, not media itself.
    Iframe,
    Unknown,
}

impl MediaKind {
    /// Directly playable media, as opposed to an embed page.
    pub fn is_direct(self) -> bool {
        matches!(self, MediaKind::Hls | MediaKind::Progressive)
    }
}

/// Which extraction step produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveredVia {
    /// `<video>`/`<source>` tag attribute.
    DirectTag,
    /// Ordered regex match inside an inline `<script>` body.
    InlineScript,
    /// Base64 / URI-encoded payload that decoded to a media URL.
    EncodedPayload,
    /// Network probe (HEAD/partial GET) confirmed the URL.
    NetworkProbe,
    /// Raw page-text scan with no structural context.
    PageFallback,
}

/// One playable-media (or embed-page) URL harvested from a source.
///
/// Immutable once created; extractors build exactly one per successful
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub source_name: String,
    pub url: String,
    pub media_kind: MediaKind,
    /// Whether the validator confirmed this URL serves playlist content.
    /// An unvalidated candidate is only returned as a last resort.
    pub validated: bool,
    pub discovered_via: DiscoveredVia,
}

impl StreamCandidate {
    pub fn new(
        source_name: impl Into<String>,
        url: impl Into<String>,
        discovered_via: DiscoveredVia,
    ) -> Self {
        let url = url.into();
        let media_kind = classify_media(&url);
        Self {
            source_name: source_name.into(),
            url,
            media_kind,
            validated: false,
            discovered_via,
        }
    }

    #[must_use]
    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }
}

/// An embed page for a source that has not been attempted yet, surfaced
/// so the caller can offer manual fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSource {
    pub name: String,
    pub url: String,
}

/// The resolver's normalized output: one per resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub success: bool,
    pub candidate: Option<StreamCandidate>,
    /// Every source actually invoked, in invocation order, including
    /// ones that failed.
    pub attempted_sources: Vec<String>,
    /// Embed pages for sources not in `attempted_sources`.
    pub backup_sources: Vec<BackupSource>,
    pub error: Option<String>,
}

impl ResolvedStream {
    pub fn found(candidate: StreamCandidate, attempted: Vec<String>) -> Self {
        Self {
            success: true,
            candidate: Some(candidate),
            attempted_sources: attempted,
            backup_sources: Vec::new(),
            error: None,
        }
    }

    pub fn failed(attempted: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            candidate: None,
            attempted_sources: attempted,
            backup_sources: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Classify a URL by the kind of media it points at.
pub fn classify_media(url: &str) -> MediaKind {
    let lower = url.to_lowercase();
    if lower.contains(".m3u8") {
        MediaKind::Hls
    } else if lower.contains(".mp4") {
        MediaKind::Progressive
    } else if ["embed", "player", "iframe", "/e/", "/v/"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        MediaKind::Iframe
    } else {
        MediaKind::Unknown
    }
}
