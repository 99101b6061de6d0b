//! `streamscout` - Multi-source movie stream resolver
//!
//! Given an IMDb identifier, probes a fixed set of third-party embed
//! sites, scrapes their pages for direct media playlists, validates the
//! candidates, and returns the best one — sequentially in priority
//! order or by racing every source against a wall-clock budget.
//!
//! # Example
//!
//! ```rust,no_run
//! use streamscout::{Resolver, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::builtin(ResolverConfig::default())?;
//!     let result = resolver.resolve_stream("tt0133093", "auto").await;
//!     if let Some(candidate) = result.candidate {
//!         println!("{} via {}", candidate.url, candidate.source_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod candidate;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod validate;

pub use cache::ResultCache;
pub use candidate::{classify_media, BackupSource, DiscoveredVia, MediaKind, ResolvedStream, StreamCandidate};
pub use config::{DispatchMode, ResolverConfig};
pub use error::{ResolveError, Result};
pub use extract::page::PageScanner;
pub use extract::Extractor;
pub use fetch::EmbedClient;
pub use metadata::{MetadataClient, MovieDetails, MovieSummary};
pub use registry::{SourceDescriptor, SourceRegistry, AUTO_SOURCE};
pub use resolver::Resolver;
pub use validate::Validator;

/// Version of streamscout
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
