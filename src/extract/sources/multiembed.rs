//! MultiEmbed extractor.
//!
//! MultiEmbed is an aggregator itself: its pages rarely expose media
//! directly but host iframes for downstream players, so the iframe-
//! following step of the ladder does most of the work here.

use std::time::Duration;

use async_trait::async_trait;

use crate::candidate::StreamCandidate;
use crate::extract::page::PageScanner;
use crate::extract::sources::scan_endpoints;
use crate::extract::Extractor;

pub struct MultiEmbed;

#[async_trait]
impl Extractor for MultiEmbed {
    fn name(&self) -> &'static str {
        "multiembed"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("https://multiembed.mov/directstream.php?video_id={identifier}&imdb=1"),
            format!("https://multiembed.mov/movie/imdb/{identifier}"),
            format!("https://multiembed.to/embed/{identifier}"),
        ]
    }

    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        scan_endpoints(scanner, self.name(), &self.endpoints(identifier), &[], timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directstream_probed_first() {
        let eps = MultiEmbed.endpoints("tt0111161");
        assert!(eps[0].contains("directstream.php"));
        assert!(eps[0].contains("tt0111161"));
    }
}
