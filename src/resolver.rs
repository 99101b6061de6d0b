//! The orchestrator: drives the registry's sources under a selection
//! policy and returns one normalized result.
//!
//! Pipeline per call: cache lookup → dispatch (sequential fallback or
//! concurrent race) → select → cache write → return. Terminal on every
//! path; retries live inside extractors, never across the pipeline.
//! `resolve_stream` never errors — total failure is a `ResolvedStream`
//! with `success = false` and aggregated diagnostics.

use tokio::sync::mpsc;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::candidate::{ResolvedStream, StreamCandidate};
use crate::config::{DispatchMode, ResolverConfig};
use crate::error::Result;
use crate::extract::page::PageScanner;
use crate::fetch::EmbedClient;
use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::validate::Validator;

/// Multi-source stream resolver.
pub struct Resolver {
    config: ResolverConfig,
    registry: SourceRegistry,
    scanner: PageScanner,
    cache: ResultCache,
}

impl Resolver {
    /// Build a resolver over a custom registry. Fails fast on a
    /// configuration that violates the timeout nesting invariant.
    pub fn new(config: ResolverConfig, registry: SourceRegistry) -> Result<Self> {
        config.validate()?;
        let client = EmbedClient::new()?;
        let validator = Validator::new(client.clone(), config.validator_timeout());
        let scanner = PageScanner::new(client, validator, config.max_iframe_depth);
        Ok(Self {
            config,
            registry,
            scanner,
            cache: ResultCache::new(),
        })
    }

    /// Resolver over the built-in source set.
    pub fn builtin(config: ResolverConfig) -> Result<Self> {
        let registry = SourceRegistry::builtin()?;
        Self::new(config, registry)
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Resolve the best available stream for `identifier`.
    ///
    /// `preferred_source` moves that source to the front of the order;
    /// `"auto"` keeps the configured ranking. Always returns a
    /// `ResolvedStream`; never errors.
    pub async fn resolve_stream(&self, identifier: &str, preferred_source: &str) -> ResolvedStream {
        if let Some(hit) = self.cache.get(identifier).await {
            debug!(identifier, "serving cached result");
            return hit;
        }

        let order = self.registry.reordered(preferred_source);
        info!(
            identifier,
            preferred = preferred_source,
            mode = ?self.config.dispatch,
            sources = order.len(),
            "resolving"
        );

        let mut result = match self.config.dispatch {
            DispatchMode::Sequential => self.sequential(&order, identifier).await,
            DispatchMode::Race => self.race(&order, identifier).await,
        };
        result.backup_sources = self
            .registry
            .backup_sources(identifier, &result.attempted_sources);

        self.cache
            .put(identifier, result.clone(), self.config.cache_ttl())
            .await;
        result
    }

    /// Try sources in order; first validated candidate wins. An
    /// unvalidated candidate (typically an embed page) is accepted only
    /// after every source has been exhausted without a validated hit.
    async fn sequential(&self, order: &[SourceDescriptor], identifier: &str) -> ResolvedStream {
        let budget = self.config.source_timeout();
        let mut attempted = Vec::with_capacity(order.len());
        let mut fallback: Option<StreamCandidate> = None;
        let mut last_error = String::from("no sources configured");

        for desc in order {
            attempted.push(desc.name.to_string());
            debug!(source = desc.name, identifier, "trying source");

            match timeout(budget, desc.extractor.extract(&self.scanner, identifier, budget)).await {
                Ok(Some(candidate)) if candidate.validated => {
                    info!(source = desc.name, url = %candidate.url, "validated stream found");
                    return ResolvedStream::found(candidate, attempted);
                }
                Ok(Some(candidate)) => {
                    debug!(source = desc.name, url = %candidate.url, "unvalidated candidate kept as fallback");
                    last_error = format!("{}: candidate failed validation", desc.name);
                    if fallback.is_none() {
                        fallback = Some(candidate);
                    }
                }
                Ok(None) => {
                    warn!(source = desc.name, identifier, "source produced nothing");
                    last_error = format!("{}: no stream found", desc.name);
                }
                Err(_) => {
                    warn!(source = desc.name, budget_ms = budget.as_millis() as u64, "source timed out");
                    last_error = format!("{}: timed out", desc.name);
                }
            }
        }

        if let Some(candidate) = fallback {
            // Deliberately weak guarantee: `validated` stays false so
            // strict callers can reject embed-only results.
            info!(source = %candidate.source_name, url = %candidate.url, "accepting unvalidated fallback");
            return ResolvedStream::found(candidate, attempted);
        }
        ResolvedStream::failed(attempted, last_error)
    }

    /// Launch every source at once under a shared wall-clock budget.
    ///
    /// First validated direct candidate (HLS/progressive) short-circuits
    /// the race; whatever tasks are still running are abandoned and
    /// their late results discarded. If the budget expires with only
    /// embed (or unvalidated) candidates, the first one that arrived is
    /// used. Arrival order deciding between peers is intentional.
    async fn race(&self, order: &[SourceDescriptor], identifier: &str) -> ResolvedStream {
        let per_source = self.config.source_timeout();
        let deadline = Instant::now() + self.config.race_budget();
        let attempted: Vec<String> = order.iter().map(|s| s.name.to_string()).collect();

        let (tx, mut rx) = mpsc::channel::<(&'static str, Option<StreamCandidate>)>(order.len());
        for desc in order {
            let tx = tx.clone();
            let extractor = desc.extractor.clone();
            let scanner = self.scanner.clone();
            let identifier = identifier.to_string();
            let name = desc.name;
            tokio::spawn(async move {
                let outcome = timeout(per_source, extractor.extract(&scanner, &identifier, per_source))
                    .await
                    .unwrap_or_else(|_| {
                        warn!(source = name, "source timed out in race");
                        None
                    });
                // Receiver may be gone if the race already ended.
                let _ = tx.send((name, outcome)).await;
            });
        }
        drop(tx);

        let mut direct_fallback: Option<StreamCandidate> = None;
        let mut embed_fallback: Option<StreamCandidate> = None;
        let mut last_error = String::from("race budget expired with no candidates");

        loop {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some((name, Some(candidate)))) => {
                    if candidate.media_kind.is_direct() && candidate.validated {
                        info!(source = name, url = %candidate.url, "direct candidate wins race");
                        return ResolvedStream::found(candidate, attempted);
                    }
                    debug!(source = name, kind = ?candidate.media_kind, validated = candidate.validated, "non-direct arrival");
                    if candidate.media_kind.is_direct() {
                        direct_fallback.get_or_insert(candidate);
                    } else {
                        embed_fallback.get_or_insert(candidate);
                    }
                }
                Ok(Some((name, None))) => {
                    last_error = format!("{name}: no stream found");
                }
                Ok(None) => break, // every source reported in
                Err(_) => {
                    debug!(identifier, "race budget expired");
                    last_error = String::from("race budget expired");
                    break;
                }
            }
        }
        // Dropping `rx` abandons stragglers; their results are never
        // cached or returned.

        if let Some(candidate) = direct_fallback.or(embed_fallback) {
            info!(source = %candidate.source_name, url = %candidate.url, "race fell back to best arrival");
            return ResolvedStream::found(candidate, attempted);
        }
        ResolvedStream::failed(attempted, last_error)
    }
}
