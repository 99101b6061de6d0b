//! StreamTape extractor.
//!
//! StreamTape never serves a playlist; its player page writes a
//! progressive `get_video` URL into the DOM via a `robotlink` innerHTML
//! assignment, so this extractor bypasses the shared ladder: find the
//! streamtape iframe on the aggregator page, fetch it, and pull the
//! link out of the script directly.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::candidate::{DiscoveredVia, StreamCandidate};
use crate::extract::page::PageScanner;
use crate::extract::urls::{is_plausible_url, make_absolute};
use crate::extract::Extractor;

static ROBOTLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'robotlink'\)\.innerHTML = '(.*?)';"#).expect("robotlink pattern"));

static STREAMTAPE_IFRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<iframe[^>]+src=["']([^"']*(?:streamtape|stape)[^"']*)["']"#)
        .expect("iframe pattern")
});

pub struct StreamTape;

impl StreamTape {
    /// Pull the robotlink video URL out of a streamtape player page.
    fn video_url(html: &str, page_url: &str) -> Option<String> {
        let link = ROBOTLINK.captures(html)?.get(1)?.as_str().trim().to_string();
        make_absolute(&link, page_url).filter(|u| is_plausible_url(u))
    }
}

#[async_trait]
impl Extractor for StreamTape {
    fn name(&self) -> &'static str {
        "streamtape"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![format!("https://multiembed.mov/movie/imdb/{identifier}")]
    }

    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        let client = scanner.client();

        for endpoint in self.endpoints(identifier) {
            let landing = match client.fetch_text(&endpoint, timeout).await {
                Ok(html) => html,
                Err(err) => {
                    debug!(source = self.name(), url = %endpoint, %err, "landing fetch failed");
                    continue;
                }
            };

            let Some(iframe_url) = STREAMTAPE_IFRAME
                .captures(&landing)
                .and_then(|c| c.get(1))
                .and_then(|m| make_absolute(m.as_str(), &endpoint))
            else {
                debug!(source = self.name(), url = %endpoint, "no streamtape iframe on page");
                continue;
            };

            let player = match client.fetch_text(&iframe_url, timeout).await {
                Ok(html) => html,
                Err(err) => {
                    debug!(source = self.name(), url = %iframe_url, %err, "player fetch failed");
                    continue;
                }
            };

            if let Some(video_url) = Self::video_url(&player, &iframe_url) {
                debug!(source = self.name(), url = %video_url, "robotlink extracted");
                let validated = scanner.validator().validate(&video_url).await;
                return Some(
                    StreamCandidate::new(self.name(), video_url, DiscoveredVia::InlineScript)
                        .validated(validated),
                );
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robotlink_extraction() {
        let html = r#"
            <script>
              document.getElementById('robotlink').innerHTML = '//streamtape.com/get_video?id=abc&expires=1&token=x';
            </script>
        "#;
        let url = StreamTape::video_url(html, "https://streamtape.com/e/abc").unwrap();
        assert_eq!(url, "https://streamtape.com/get_video?id=abc&expires=1&token=x");
    }

    #[test]
    fn test_no_robotlink_yields_none() {
        assert!(StreamTape::video_url("<html></html>", "https://streamtape.com/e/x").is_none());
    }

    #[test]
    fn test_iframe_pattern_finds_stape_hosts() {
        let html = r#"<iframe src="https://stape.fun/e/xyz" allowfullscreen></iframe>"#;
        let caps = STREAMTAPE_IFRAME.captures(html).unwrap();
        assert_eq!(&caps[1], "https://stape.fun/e/xyz");
    }
}
