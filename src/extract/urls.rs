//! URL normalization and playlist-marker heuristics.
//!
//! Everything scraped off an embed page is untrusted text; these helpers
//! turn whatever shape of reference the page used (protocol-relative,
//! root-relative, bare relative) into an absolute URL, and classify
//! playlist URLs.

use url::Url;

/// Content-type fragments that mark an HLS playlist response.
pub const PLAYLIST_MIME_MARKERS: &[&str] = &["mpegurl", "x-mpegurl", "vnd.apple.mpegurl"];

/// Literal tags a valid playlist file begins with.
pub const PLAYLIST_MAGIC: &[&str] = &[
    "#EXTM3U",
    "#EXT-X-VERSION",
    "#EXT-X-TARGETDURATION",
    "#EXT-X-MEDIA-SEQUENCE",
];

/// Resolve a scraped reference against the page it came from.
///
/// Handles protocol-relative (`//host/x`), root-relative (`/x`),
/// already-absolute, and path-relative forms. Returns `None` only when
/// the base itself cannot be parsed.
pub fn make_absolute(raw: &str, base: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let base = Url::parse(base).ok()?;
    base.join(raw).ok().map(String::from)
}

/// Does this URL point at a media playlist?
pub fn has_playlist_marker(url: &str) -> bool {
    url.to_lowercase().contains(".m3u8")
}

/// Does a declared content type match a playlist MIME?
pub fn is_playlist_mime(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    PLAYLIST_MIME_MARKERS.iter().any(|m| ct.contains(m))
}

/// Does a body prefix begin with playlist magic?
pub fn has_playlist_magic(body: &[u8]) -> bool {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    PLAYLIST_MAGIC.iter().any(|m| trimmed.starts_with(m))
}

/// Heuristic: is this a master (top-level) playlist URL rather than a
/// bitrate variant?
pub fn looks_like_master(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("master") || lower.contains("playlist.m3u8") || lower.contains("index.m3u8")
}

/// Minimal sanity check on a scraped URL before we spend a network probe
/// on it.
pub fn is_plausible_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => (u.scheme() == "http" || u.scheme() == "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative_resolves_against_host() {
        assert_eq!(
            make_absolute("/x/y.m3u8", "https://host/a/b").as_deref(),
            Some("https://host/x/y.m3u8")
        );
    }

    #[test]
    fn test_protocol_relative_gets_https() {
        assert_eq!(
            make_absolute("//host2/z.m3u8", "https://host/a/b").as_deref(),
            Some("https://host2/z.m3u8")
        );
    }

    #[test]
    fn test_absolute_passthrough() {
        assert_eq!(
            make_absolute("https://cdn/x.m3u8", "https://host/a").as_deref(),
            Some("https://cdn/x.m3u8")
        );
    }

    #[test]
    fn test_path_relative_joins() {
        assert_eq!(
            make_absolute("y.m3u8", "https://host/a/b").as_deref(),
            Some("https://host/a/y.m3u8")
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(make_absolute("  ", "https://host/"), None);
    }

    #[test]
    fn test_playlist_mime_markers() {
        assert!(is_playlist_mime("application/vnd.apple.mpegurl"));
        assert!(is_playlist_mime("audio/x-mpegurl; charset=utf-8"));
        assert!(!is_playlist_mime("text/html"));
    }

    #[test]
    fn test_playlist_magic() {
        assert!(has_playlist_magic(b"#EXTM3U\n#EXT-X-VERSION:3\n"));
        assert!(has_playlist_magic(b"\n  #EXT-X-TARGETDURATION:10"));
        assert!(!has_playlist_magic(b"<!DOCTYPE html><html>"));
    }

    #[test]
    fn test_master_heuristic() {
        assert!(looks_like_master("https://cdn/hls/master.m3u8"));
        assert!(looks_like_master("https://cdn/hls/index.m3u8?t=1"));
        assert!(!looks_like_master("https://cdn/hls/720p_002.m3u8"));
    }

    #[test]
    fn test_plausible_url() {
        assert!(is_plausible_url("https://cdn/x.m3u8"));
        assert!(!is_plausible_url("data:text/html;base64,xxxx"));
        assert!(!is_plausible_url("not a url"));
    }
}
