//! `streamscout` CLI - resolve, search, and validate movie streams

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use streamscout::{
    DispatchMode, EmbedClient, MetadataClient, Resolver, ResolverConfig, Validator,
};

#[derive(Parser)]
#[command(name = "streamscout")]
#[command(about = "Multi-source movie stream resolver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the best stream for an IMDb ID
    Resolve {
        /// IMDb identifier (e.g. tt0133093)
        imdb_id: String,

        /// Preferred source, or "auto" for registry order
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Race all sources instead of sequential fallback
        #[arg(short, long)]
        race: bool,

        /// Per-source timeout in milliseconds
        #[arg(long, default_value = "15000")]
        timeout_ms: u64,

        /// Print the full result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Search movies by keyword (OMDb)
    Search {
        /// Search text
        query: String,

        /// OMDb API key (falls back to $OMDB_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show details for one IMDb ID (OMDb)
    Info {
        /// IMDb identifier
        imdb_id: String,

        /// OMDb API key (falls back to $OMDB_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Probe a stream URL and report whether it serves a playlist
    Validate {
        /// URL to probe
        url: String,
    },

    /// List the configured sources in fallback order
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { imdb_id, source, race, timeout_ms, json } => {
            cmd_resolve(&imdb_id, &source, race, timeout_ms, json).await?;
        }
        Commands::Search { query, api_key } => {
            cmd_search(&query, api_key).await?;
        }
        Commands::Info { imdb_id, api_key } => {
            cmd_info(&imdb_id, api_key).await?;
        }
        Commands::Validate { url } => {
            cmd_validate(&url).await?;
        }
        Commands::Sources => {
            cmd_sources()?;
        }
    }

    Ok(())
}

async fn cmd_resolve(imdb_id: &str, source: &str, race: bool, timeout_ms: u64, json: bool) -> Result<()> {
    let config = ResolverConfig {
        source_timeout_ms: timeout_ms,
        dispatch: if race { DispatchMode::Race } else { DispatchMode::Sequential },
        ..Default::default()
    };
    let resolver = Resolver::builtin(config)?;

    println!("🎬 Resolving: {imdb_id} (source: {source})");
    let start = Instant::now();
    let result = resolver.resolve_stream(imdb_id, source).await;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("   Time: {:.2}s", elapsed.as_secs_f64());
    println!("   Attempted: {}", result.attempted_sources.join(", "));

    if let Some(candidate) = &result.candidate {
        println!("\n✅ {} [{:?}] via {}", candidate.url, candidate.media_kind, candidate.source_name);
        if !candidate.validated {
            println!("⚠️  Candidate is unvalidated (embed-page fallback)");
        }
    } else {
        println!("\n❌ No stream found: {}", result.error.as_deref().unwrap_or("unknown"));
    }

    if !result.backup_sources.is_empty() {
        println!("\n🔁 Backup embeds:");
        for backup in &result.backup_sources {
            println!("   {} — {}", backup.name, backup.url);
        }
    }

    Ok(())
}

async fn cmd_search(query: &str, api_key: Option<String>) -> Result<()> {
    let metadata = metadata_client(api_key)?;
    let movies = metadata.search_by_keyword(query).await?;

    if movies.is_empty() {
        println!("❌ No results for \"{query}\"");
        return Ok(());
    }

    println!("🔍 {} results:\n", movies.len());
    for movie in movies {
        println!("   {} ({}) — {}", movie.title, movie.year, movie.imdb_id);
    }
    Ok(())
}

async fn cmd_info(imdb_id: &str, api_key: Option<String>) -> Result<()> {
    let metadata = metadata_client(api_key)?;
    match metadata.get_details(imdb_id).await? {
        Some(details) => {
            println!("🎬 {} ({})", details.title, details.year);
            if let Some(genre) = &details.genre {
                println!("   Genre: {genre}");
            }
            if let Some(director) = &details.director {
                println!("   Director: {director}");
            }
            if let Some(rating) = &details.rating {
                println!("   IMDb rating: {rating}");
            }
            if let Some(plot) = &details.plot {
                println!("\n{plot}");
            }
        }
        None => println!("❌ No movie found for {imdb_id}"),
    }
    Ok(())
}

async fn cmd_validate(url: &str) -> Result<()> {
    let client = EmbedClient::new()?;
    let validator = Validator::new(client, Duration::from_secs(8));

    println!("🔎 Probing: {url}");
    if validator.validate(url).await {
        println!("✅ Serves playlist content");
    } else {
        println!("❌ Not a working playlist stream");
    }
    Ok(())
}

fn cmd_sources() -> Result<()> {
    let resolver = Resolver::builtin(ResolverConfig::default())?;
    println!("📡 Sources in fallback order:\n");
    for desc in resolver.registry().sources() {
        println!("   {}. {}", desc.priority_rank + 1, desc.name);
    }
    Ok(())
}

fn metadata_client(api_key: Option<String>) -> Result<MetadataClient> {
    let key = api_key
        .or_else(|| std::env::var("OMDB_API_KEY").ok())
        .ok_or_else(|| anyhow::anyhow!("no API key: pass --api-key or set OMDB_API_KEY"))?;
    Ok(MetadataClient::new(EmbedClient::new()?, key))
}
