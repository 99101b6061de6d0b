//! VidSrc extractor.
//!
//! VidSrc pages usually carry the playlist inside an hls.js or plain
//! config assignment; failing that they redirect through a nested
//! vidsrc iframe which the shared ladder follows.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::StreamCandidate;
use crate::extract::page::PageScanner;
use crate::extract::sources::scan_endpoints;
use crate::extract::Extractor;

static QUIRKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // new Hls().loadSource("...") with the instance inlined
        r#"(?i)new\s+Hls\([^)]*\)\.loadSource\s*\(\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // trailing config entry: .m3u8": "..."
        r#"\.m3u8["']?\s*:\s*["']([^"']*\.m3u8[^"']*)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("vidsrc pattern"))
    .collect()
});

pub struct VidSrc;

#[async_trait]
impl Extractor for VidSrc {
    fn name(&self) -> &'static str {
        "vidsrc"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("https://vidsrc.me/embed/movie?imdb={identifier}"),
            format!("https://vidsrc.to/embed/movie/{identifier}"),
            format!("https://vidsrc.xyz/embed/movie/{identifier}"),
        ]
    }

    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        scan_endpoints(scanner, self.name(), &self.endpoints(identifier), &QUIRKS, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_carry_identifier() {
        let eps = VidSrc.endpoints("tt0133093");
        assert!(!eps.is_empty());
        assert!(eps.iter().all(|e| e.contains("tt0133093")));
    }

    #[test]
    fn test_hls_quirk_matches() {
        let caps = QUIRKS[0]
            .captures(r#"new Hls({debug:false}).loadSource("https://cdn/v.m3u8");"#)
            .unwrap();
        assert_eq!(&caps[1], "https://cdn/v.m3u8");
    }
}
