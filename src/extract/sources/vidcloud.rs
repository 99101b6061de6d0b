//! VidCloud extractor.
//!
//! VidCloud pages are plain: the playlist sits in a `<video>`/`<source>`
//! tag or a bare script URL, so the shared ladder needs no quirks.

use std::time::Duration;

use async_trait::async_trait;

use crate::candidate::StreamCandidate;
use crate::extract::page::PageScanner;
use crate::extract::sources::scan_endpoints;
use crate::extract::Extractor;

pub struct VidCloud;

#[async_trait]
impl Extractor for VidCloud {
    fn name(&self) -> &'static str {
        "vidcloud"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("https://vidcloud9.com/embed/{identifier}"),
            format!("https://membed.net/embed/{identifier}"),
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
    fn test_endpoints_nonempty() {
        assert!(!VidCloud.endpoints("tt0137523").is_empty());
    }
}
