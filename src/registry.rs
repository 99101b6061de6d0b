//! Source registry: the fixed, process-wide set of known sources and
//! their fallback ordering.
//!
//! Built once at startup and read-only afterwards. Construction fails
//! fast on an empty registry or a source with no endpoints; nothing is
//! recoverable per-request about a broken configuration.

use std::sync::Arc;

use crate::candidate::BackupSource;
use crate::error::{ResolveError, Result};
use crate::extract::sources::{EmbedProbe, MixDrop, MultiEmbed, StreamTape, VidCloud, VidSrc};
use crate::extract::Extractor;

/// Identifier used only to exercise endpoint templates at startup.
const PROBE_ID: &str = "tt0000001";

/// The preferred-source value meaning "registry order as configured".
pub const AUTO_SOURCE: &str = "auto";

/// One registered source: name, rank, and its extractor capability.
#[derive(Clone)]
pub struct SourceDescriptor {
    pub name: &'static str,
    /// Default tie-break only; the resolver may reorder per request.
    pub priority_rank: usize,
    pub extractor: Arc<dyn Extractor>,
}

impl std::fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("name", &self.name)
            .field("priority_rank", &self.priority_rank)
            .finish_non_exhaustive()
    }
}

/// Immutable-after-init set of sources in fallback order.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Build a registry from extractors in priority order.
    pub fn new(extractors: Vec<Arc<dyn Extractor>>) -> Result<Self> {
        if extractors.is_empty() {
            return Err(ResolveError::Config("source registry is empty".into()));
        }
        let mut sources = Vec::with_capacity(extractors.len());
        for (rank, extractor) in extractors.into_iter().enumerate() {
            if extractor.endpoints(PROBE_ID).is_empty() {
                return Err(ResolveError::Config(format!(
                    "source '{}' declares no endpoints",
                    extractor.name()
                )));
            }
            sources.push(SourceDescriptor {
                name: extractor.name(),
                priority_rank: rank,
                extractor,
            });
        }
        Ok(Self { sources })
    }

    /// The built-in source set, most reliable first.
    pub fn builtin() -> Result<Self> {
        Self::new(vec![
            Arc::new(VidSrc),
            Arc::new(MultiEmbed),
            Arc::new(MixDrop),
            Arc::new(StreamTape),
            Arc::new(VidCloud),
            Arc::new(EmbedProbe),
        ])
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name).collect()
    }

    /// Source list with `preferred` moved to the front, relative order
    /// of the rest intact. `"auto"` or an unknown name leaves the
    /// configured order untouched.
    pub fn reordered(&self, preferred: &str) -> Vec<SourceDescriptor> {
        let mut out = self.sources.clone();
        if preferred != AUTO_SOURCE {
            if let Some(pos) = out.iter().position(|s| s.name == preferred) {
                let chosen = out.remove(pos);
                out.insert(0, chosen);
            }
        }
        out
    }

    /// Embed pages for sources not already attempted, for the caller's
    /// manual-fallback list.
    pub fn backup_sources(&self, identifier: &str, exclude: &[String]) -> Vec<BackupSource> {
        self.sources
            .iter()
            .filter(|s| !exclude.iter().any(|e| e == s.name))
            .filter_map(|s| {
                s.extractor.endpoints(identifier).into_iter().next().map(|url| BackupSource {
                    name: s.name.to_string(),
                    url,
                })
            })
            .collect()
    }
}
