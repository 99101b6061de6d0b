//! Extraction framework: one [`Extractor`] per source site, all driving
//! the shared [`page::PageScanner`] ladder with their own endpoints and
//! quirk patterns.

pub mod page;
pub mod sources;
pub mod urls;

use std::time::Duration;

use async_trait::async_trait;

use crate::candidate::StreamCandidate;
use crate::extract::page::PageScanner;

/// A source-specific stream extractor.
///
/// Implementations are stateless and independent. The boundary contract:
/// `extract` never errors past itself — network faults, parse failures,
/// and malformed pages are logged inside and collapse to `None`.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Stable lowercase source name; doubles as the `preferred_source`
    /// key and `StreamCandidate::source_name`.
    fn name(&self) -> &'static str;

    /// Embed-page URL templates for an identifier, in probe order.
    /// Never empty; the registry enforces this at startup.
    fn endpoints(&self, identifier: &str) -> Vec<String>;

    /// Try to pull a playable stream for `identifier`.
    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate>;
}
