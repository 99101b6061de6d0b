//! Shared page-scan framework used by every source extractor.
//!
//! Given an embed page, candidates are hunted in a fixed priority order:
//!
//! 1. `<video>`/`<source>` tag attributes
//! 2. inline `<script>` bodies, against an ordered pattern table
//!    (narrow player-specific idioms first, broad catch-alls last —
//!    the ordering is a precision/recall trade-off and must hold)
//! 3. base64 / URI-encoded payloads that decode to a playlist URL
//! 4. raw page text, any absolute playlist URL
//! 5. iframe redirects, followed one level deep with a visited set
//!
//! The first candidate the validator confirms wins. If nothing
//! validates, the highest-confidence unvalidated candidate is returned
//! as a last resort (typically an embed-page URL) so the resolver can
//! decide whether to accept it.

use std::collections::HashSet;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, trace};

use crate::candidate::{DiscoveredVia, StreamCandidate};
use crate::extract::urls::{has_playlist_marker, is_plausible_url, looks_like_master, make_absolute};
use crate::fetch::EmbedClient;
use crate::validate::Validator;

/// Ordered script patterns: player-library idioms first, catch-alls
/// last. First pattern that matches anything in a script block wins for
/// that block.
static SCRIPT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // jwplayer("player").setup({ file: "..." })
        r#"(?i)jwplayer\([^)]*\)\.setup\([^)]*file["']?\s*:\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // videojs(...).src({ src: "..." }) and inline videojs configs
        r#"(?i)videojs[^;]*?src["']?\s*:\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // player.src("...")
        r#"(?i)player\s*\.\s*src\s*\(\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // hls.js: hls.loadSource("...")
        r#"(?i)Hls[^;]*?\.loadSource\s*\(\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // generic config keys: file/source/src/url/playlist: "..."
        r#"(?i)(?:file|source|src|url|playlist)["'\s]*[:=]\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // any quoted playlist URL
        r#"["']([^"']*\.m3u8[^"']*)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("script pattern"))
    .collect()
});

static ATOB_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"atob\s*\(\s*["']([A-Za-z0-9+/=]+)["']\s*\)"#).expect("atob pattern"));

static URI_DECODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"decodeURIComponent\s*\(\s*["']([^"']+)["']\s*\)"#).expect("uri pattern")
});

/// Any absolute playlist URL in raw text.
static RAW_PLAYLIST_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^"'\s<>\\]+\.m3u8[^"'\s<>\\]*"#).expect("raw url pattern"));

static VIDEO_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("video, video source, source").expect("video selector"));
static SCRIPT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("script selector"));
static IFRAME_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("iframe, frame").expect("iframe selector"));

/// Drives the scan ladder for one source. Cheap to clone; per-source
/// extractors layer their quirk patterns on top.
#[derive(Debug, Clone)]
pub struct PageScanner {
    client: EmbedClient,
    validator: Validator,
    max_iframe_depth: u8,
}

impl PageScanner {
    pub fn new(client: EmbedClient, validator: Validator, max_iframe_depth: u8) -> Self {
        Self {
            client,
            validator,
            max_iframe_depth,
        }
    }

    pub fn client(&self) -> &EmbedClient {
        &self.client
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Scan an embed page for a playable stream.
    ///
    /// `quirks` are source-specific patterns tried before the shared
    /// table. Returns the first validated candidate, or the best
    /// unvalidated one as a last resort.
    pub async fn scan(
        &self,
        source_name: &str,
        page_url: &str,
        quirks: &[Regex],
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        let mut visited = HashSet::new();
        self.scan_inner(source_name, page_url, quirks, timeout, self.max_iframe_depth, &mut visited)
            .await
    }

    fn scan_inner<'a>(
        &'a self,
        source_name: &'a str,
        page_url: &'a str,
        quirks: &'a [Regex],
        timeout: Duration,
        depth_left: u8,
        visited: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, Option<StreamCandidate>> {
        Box::pin(async move {
            if !visited.insert(page_url.to_string()) {
                trace!(url = page_url, "already visited, skipping");
                return None;
            }

            let html = match self.client.fetch_text(page_url, timeout).await {
                Ok(html) => html,
                Err(err) => {
                    debug!(source = source_name, url = page_url, %err, "page fetch failed");
                    return None;
                }
            };

            let mut fallback: Option<StreamCandidate> = None;
            let mut iframe_targets = Vec::new();

            // The parsed document is not Send, so everything derived
            // from it is collected before the first await.
            let harvests = {
                let doc = Html::parse_document(&html);
                let mut harvests: Vec<(DiscoveredVia, Vec<String>)> = Vec::new();

                let tag_urls: Vec<String> = doc
                    .select(&VIDEO_SEL)
                    .filter_map(|el| el.value().attr("src").or_else(|| el.value().attr("data-src")))
                    .filter(|src| has_playlist_marker(src))
                    .map(String::from)
                    .collect();
                harvests.push((DiscoveredVia::DirectTag, tag_urls));

                let mut script_urls = Vec::new();
                for script in doc.select(&SCRIPT_SEL) {
                    let body: String = script.text().collect();
                    if body.is_empty() {
                        continue;
                    }
                    script_urls.extend(scan_script_block(&body, quirks));
                }
                harvests.push((DiscoveredVia::InlineScript, script_urls));

                harvests.push((DiscoveredVia::EncodedPayload, scan_encoded_payloads(&html)));

                let raw_urls: Vec<String> = RAW_PLAYLIST_URL
                    .find_iter(&html)
                    .map(|m| m.as_str().to_string())
                    .collect();
                harvests.push((DiscoveredVia::PageFallback, raw_urls));

                for iframe in doc.select(&IFRAME_SEL) {
                    if let Some(src) = iframe.value().attr("src") {
                        if !src.starts_with("data:") {
                            iframe_targets.push(src.to_string());
                        }
                    }
                }

                harvests
            };

            for (via, urls) in harvests {
                let ranked = rank_urls(urls, page_url);
                for url in ranked {
                    let candidate = StreamCandidate::new(source_name, &url, via);
                    if self.validator.validate(&url).await {
                        debug!(source = source_name, url = %url, ?via, "validated candidate");
                        return Some(candidate.validated(true));
                    }
                    trace!(source = source_name, url = %url, ?via, "candidate failed validation");
                    if fallback.is_none() {
                        fallback = Some(candidate);
                    }
                }
            }

            // Iframe redirects: follow one level, reusing the visited
            // set so mutually-embedding pages terminate.
            for target in iframe_targets {
                let Some(iframe_url) = make_absolute(&target, page_url) else {
                    continue;
                };
                if !is_plausible_url(&iframe_url) {
                    continue;
                }
                if depth_left > 0 {
                    debug!(source = source_name, url = %iframe_url, "following iframe");
                    if let Some(inner) = self
                        .scan_inner(source_name, &iframe_url, quirks, timeout, depth_left - 1, visited)
                        .await
                    {
                        if inner.validated {
                            return Some(inner);
                        }
                        if fallback.is_none() {
                            fallback = Some(inner);
                        }
                        continue;
                    }
                }
                // The iframe page itself, as an embed candidate.
                if fallback.is_none() {
                    fallback = Some(StreamCandidate::new(
                        source_name,
                        iframe_url,
                        DiscoveredVia::DirectTag,
                    ));
                }
            }

            fallback
        })
    }
}

/// Apply the quirk patterns then the shared table to one script block.
/// The first pattern with any match harvests that block.
fn scan_script_block(body: &str, quirks: &[Regex]) -> Vec<String> {
    for pattern in quirks.iter().chain(SCRIPT_PATTERNS.iter()) {
        let matches: Vec<String> = pattern
            .captures_iter(body)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(0)))
            .map(|m| m.as_str().to_string())
            .filter(|u| has_playlist_marker(u))
            .collect();
        if !matches.is_empty() {
            return matches;
        }
    }
    Vec::new()
}

/// Decode `atob("...")` and `decodeURIComponent("...")` arguments and
/// keep any that turn into playlist URLs.
fn scan_encoded_payloads(html: &str) -> Vec<String> {
    let mut found = Vec::new();

    for cap in ATOB_PATTERN.captures_iter(html) {
        if let Ok(bytes) = BASE64.decode(&cap[1]) {
            if let Ok(decoded) = String::from_utf8(bytes) {
                if has_playlist_marker(&decoded) {
                    found.extend(
                        RAW_PLAYLIST_URL
                            .find_iter(&decoded)
                            .map(|m| m.as_str().to_string()),
                    );
                }
            }
        }
    }

    for cap in URI_DECODE_PATTERN.captures_iter(html) {
        let decoded = urlencoding::decode(&cap[1])
            .map(std::borrow::Cow::into_owned)
            .unwrap_or_default();
        if has_playlist_marker(&decoded) {
            found.extend(
                RAW_PLAYLIST_URL
                    .find_iter(&decoded)
                    .map(|m| m.as_str().to_string()),
            );
        }
    }

    found
}

/// Absolutize, dedupe, and order a harvest for probing: master
/// playlists first, then shorter URLs (signed variant URLs tend to be
/// long; this is a heuristic, not a guarantee).
fn rank_urls(urls: Vec<String>, base: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<String> = urls
        .into_iter()
        .filter_map(|u| make_absolute(&u, base))
        .filter(|u| is_plausible_url(u))
        .filter(|u| seen.insert(u.clone()))
        .collect();
    ranked.sort_by_key(|u| (!looks_like_master(u), u.len()));
    ranked
}
