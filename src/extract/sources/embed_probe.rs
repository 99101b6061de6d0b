//! Direct-embed probe sweep.
//!
//! Last-line source: walk the list of known embed endpoints, pull any
//! playlist URL straight out of the raw page, and when a page merely
//! looks like it hosts a player, hand its URL back as an unvalidated
//! embed candidate. This is the weakest source and sits last in the
//! registry order.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::candidate::{DiscoveredVia, StreamCandidate};
use crate::extract::page::PageScanner;
use crate::extract::urls::make_absolute;
use crate::extract::Extractor;

static PLAYLIST_IN_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:src|source|url|file|playlist)["':\s]*["']([^"']*\.m3u8[^"']*)["']|https?://[^"'\s<>]+\.m3u8[^"'\s<>]*"#)
        .expect("content pattern")
});

/// Words that mark a page as hosting a player rather than a parked
/// domain or an error shell.
const PLAYER_INDICATORS: &[&str] = &[
    "video", "player", "stream", "embed", "iframe", "source", "jwplayer", "videojs",
];

pub struct EmbedProbe;

impl EmbedProbe {
    fn harvest(html: &str, base: &str) -> Vec<String> {
        PLAYLIST_IN_CONTENT
            .captures_iter(html)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(0)))
            .filter_map(|m| make_absolute(m.as_str(), base))
            .collect()
    }

    fn looks_like_player(html: &str) -> bool {
        let lower = html.to_lowercase();
        PLAYER_INDICATORS.iter().any(|kw| lower.contains(kw))
    }
}

#[async_trait]
impl Extractor for EmbedProbe {
    fn name(&self) -> &'static str {
        "embed_probe"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("https://2embed.cc/embed/movie?imdb={identifier}"),
            format!("https://www.2embed.to/embed/imdb/movie?id={identifier}"),
            format!("https://embed.su/embed/movie/{identifier}"),
            format!("https://moviesapi.club/movie/{identifier}"),
            format!("https://autoembed.cc/movie/imdb/{identifier}"),
            format!("https://vidsrc.xyz/embed/movie/{identifier}"),
            format!("https://www.2embed.org/embed/movie/{identifier}"),
        ]
    }

    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        let client = scanner.client();
        let mut fallback = None;

        for endpoint in self.endpoints(identifier) {
            let html = match client.fetch_text(&endpoint, timeout).await {
                Ok(html) => html,
                Err(err) => {
                    debug!(source = self.name(), url = %endpoint, %err, "probe failed");
                    continue;
                }
            };

            for url in Self::harvest(&html, &endpoint) {
                if scanner.validator().validate(&url).await {
                    debug!(source = self.name(), url = %url, "direct playlist on embed page");
                    return Some(
                        StreamCandidate::new(self.name(), url, DiscoveredVia::PageFallback)
                            .validated(true),
                    );
                }
            }

            if fallback.is_none() && Self::looks_like_player(&html) {
                debug!(source = self.name(), url = %endpoint, "page smells like a player");
                fallback = Some(StreamCandidate::new(
                    self.name(),
                    endpoint,
                    DiscoveredVia::PageFallback,
                ));
            }
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_key_value_and_bare_urls() {
        let html = r#"
            <script>var cfg = {file: "/hls/v.m3u8"};</script>
            see also https://cdn.example/direct.m3u8?t=2
        "#;
        let urls = EmbedProbe::harvest(html, "https://host/embed/movie/tt1");
        assert!(urls.contains(&"https://host/hls/v.m3u8".to_string()));
        assert!(urls.contains(&"https://cdn.example/direct.m3u8?t=2".to_string()));
    }

    #[test]
    fn test_player_indicator_gate() {
        assert!(EmbedProbe::looks_like_player("<div id=\"player\"></div>"));
        assert!(!EmbedProbe::looks_like_player("<h1>404 Not Found</h1>"));
    }

    #[test]
    fn test_endpoints_cover_known_hosts() {
        let eps = EmbedProbe.endpoints("tt0120737");
        assert!(eps.len() >= 5);
        assert!(eps.iter().all(|e| e.contains("tt0120737")));
    }
}
