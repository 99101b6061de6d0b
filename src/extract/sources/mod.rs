//! Per-source extractors.
//!
//! Each source is independent and stateless; quirks live with the
//! source that needs them.

pub mod embed_probe;
pub mod mixdrop;
pub mod multiembed;
pub mod streamtape;
pub mod vidcloud;
pub mod vidsrc;

pub use embed_probe::EmbedProbe;
pub use mixdrop::MixDrop;
pub use multiembed::MultiEmbed;
pub use streamtape::StreamTape;
pub use vidcloud::VidCloud;
pub use vidsrc::VidSrc;

use std::time::Duration;

use regex::Regex;

use crate::candidate::StreamCandidate;
use crate::extract::page::PageScanner;

/// Shared endpoint loop: scan each embed page in order, return the
/// first validated candidate, and keep the earliest unvalidated one as
/// a last resort.
pub(crate) async fn scan_endpoints(
    scanner: &PageScanner,
    source_name: &'static str,
    endpoints: &[String],
    quirks: &[Regex],
    timeout: Duration,
) -> Option<StreamCandidate> {
    let mut fallback = None;
    for endpoint in endpoints {
        match scanner.scan(source_name, endpoint, quirks, timeout).await {
            Some(candidate) if candidate.validated => return Some(candidate),
            Some(candidate) => {
                if fallback.is_none() {
                    fallback = Some(candidate);
                }
            }
            None => {}
        }
    }
    fallback
}
