//! world-news-server binary
//!
//! Hosts news feeds for any number of owners, answers line-delimited JSON
//! commands on stdin, and flushes dirty feeds to JSON files.
//!
//! ## Configuration (CLI / env, layered over an optional TOML/JSON file)
//!
//! | Key                        | Default        | Description                        |
//! |----------------------------|----------------|------------------------------------|
//! | `NEWS_CONFIG`              | *(none)*       | Optional config file               |
//! | `NEWS_DATA_DIR`            | `news-data`    | Directory holding feed files       |
//! | `NEWS_FLUSH_INTERVAL_SECS` | `30`           | Dirty-feed flush interval          |
//! | `NEWS_MAX_ENTRIES`         | `400`          | Events kept per feed               |
//! | `NEWS_TTL_SECS`            | `10800`        | Event time-to-live                 |
//!
//! Flags and env vars win over the file; the file wins over defaults.

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use world_news::{
    agent::{NewsAgent, NewsAgentConfig},
    service::NewsService,
    store::JsonFileStore,
    types::{FeedLimits, MAX_ENTRIES, TTL_MS},
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "world-news-server", about = "World News feed host", version)]
struct Args {
    /// Config file (TOML, JSON, YAML …)
    #[arg(long, env = "NEWS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding feed files
    #[arg(long, env = "NEWS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Dirty-feed flush interval (seconds)
    #[arg(long, env = "NEWS_FLUSH_INTERVAL_SECS")]
    flush_interval_secs: Option<u32>,

    /// Events kept per feed
    #[arg(long, env = "NEWS_MAX_ENTRIES")]
    max_entries: Option<u32>,

    /// Event time-to-live (seconds)
    #[arg(long, env = "NEWS_TTL_SECS")]
    ttl_secs: Option<u32>,
}

/// Effective settings after layering.
#[derive(Debug, Deserialize)]
struct Settings {
    data_dir: PathBuf,
    flush_interval_secs: u64,
    max_entries: usize,
    ttl_secs: i64,
}

impl Settings {
    fn load(args: &Args) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", "news-data")?
            .set_default("flush_interval_secs", 30_i64)?
            .set_default("max_entries", MAX_ENTRIES as i64)?
            .set_default("ttl_secs", TTL_MS / 1000)?;

        if let Some(path) = &args.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder
            .set_override_option("data_dir", args.data_dir.as_ref().map(|p| p.display().to_string()))?
            .set_override_option("flush_interval_secs", args.flush_interval_secs.map(i64::from))?
            .set_override_option("max_entries", args.max_entries.map(i64::from))?
            .set_override_option("ttl_secs", args.ttl_secs.map(i64::from))?
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn limits(&self) -> FeedLimits {
        FeedLimits {
            max_entries: self.max_entries,
            ttl_ms: self.ttl_secs.saturating_mul(1000),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging (stderr – stdout carries replies)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("world_news=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(&args)?;

    tracing::info!(
        "Starting world-news-server (data_dir='{}', max_entries={}, ttl={}s, flush={}s)",
        settings.data_dir.display(),
        settings.max_entries,
        settings.ttl_secs,
        settings.flush_interval_secs,
    );

    let store = JsonFileStore::new(settings.data_dir.clone());
    let service = Arc::new(Mutex::new(NewsService::new(
        Box::new(store),
        settings.limits(),
    )));

    let agent_config = NewsAgentConfig {
        flush_interval: Duration::from_secs(settings.flush_interval_secs.max(1)),
    };

    // Run until input closes or shutdown
    NewsAgent::new(agent_config, service).run().await
}
