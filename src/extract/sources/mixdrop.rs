//! MixDrop extractor.
//!
//! MixDrop players stash the delivery URL in `MDCore.*` assignments,
//! sometimes base64-wrapped. MixDrop has no IMDb-keyed endpoint of its
//! own; it is reached through the aggregator page, whose mixdrop iframe
//! the ladder follows.

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
        // MDCore.wurl = "...m3u8..."
        r#"(?i)MDCore\.\w+\s*=\s*["']([^"']*\.m3u8[^"']*)["']"#,
        // file: "..." inside the player bootstrap
        r#"(?i)file["'\s]*:\s*["']([^"']*\.m3u8[^"']*)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("mixdrop pattern"))
    .collect()
});

pub struct MixDrop;

#[async_trait]
impl Extractor for MixDrop {
    fn name(&self) -> &'static str {
        "mixdrop"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("https://multiembed.mov/directstream.php?video_id={identifier}&imdb=1&server=mixdrop"),
            format!("https://multiembed.mov/movie/imdb/{identifier}"),
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
    fn test_mdcore_quirk_matches() {
        let caps = QUIRKS[0]
            .captures(r#"MDCore.wurl = "//s-delivery.mxdcontent.net/v/abc.m3u8?s=x";"#)
            .unwrap();
        assert_eq!(&caps[1], "//s-delivery.mxdcontent.net/v/abc.m3u8?s=x");
    }

    #[test]
    fn test_endpoints_request_mixdrop_server() {
        let eps = MixDrop.endpoints("tt0068646");
        assert!(eps[0].contains("server=mixdrop"));
    }
}
