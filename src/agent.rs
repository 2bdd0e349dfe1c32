//! NewsAgent – drives a [`NewsService`] from line-delimited JSON commands.
//!
//! ## Event contract (inbound, one JSON object per line)
//!
//! | `cmd`    | Payload keys                              | Effect                   |
//! |----------|-------------------------------------------|--------------------------|
//! | `record` | owner, tick, text, dim?, x?, z?, created_at_ms? | `NewsFeed::add`    |
//! | `latest` | owner, limit                              | `NewsFeed::latest`       |
//! | `near`   | owner, dim?, x, z, radius, limit          | `NewsFeed::latest_near`  |
//! | `prune`  | owner                                     | `NewsFeed::prune_expired`|
//! | `stats`  | *(empty)*                                 | reply with `HostStats`   |
//! | `flush`  | *(empty)*                                 | save dirty feeds now     |
//!
//! ## Outbound
//!
//! Exactly one [`NewsReply`] JSON line per non-blank input line. Malformed
//! input yields a `status = "error"` reply; it never stops the loop.
//!
//! Dirty feeds are also flushed on a fixed interval and once more on
//! shutdown.

use crate::protocol::{NewsCommand, NewsReply};
use crate::service::NewsService;
use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

// ---------------------------------------------------------------------------
// Config for NewsAgent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewsAgentConfig {
    /// How often dirty feeds are written to the store.
    pub flush_interval: Duration,
}

impl Default for NewsAgentConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// NewsAgent
// ---------------------------------------------------------------------------

/// Wraps a shared [`NewsService`]. All access goes through one mutex, so
/// every feed sees a single writer at a time.
pub struct NewsAgent {
    config: NewsAgentConfig,
    service: Arc<Mutex<NewsService>>,
}

impl NewsAgent {
    pub fn new(config: NewsAgentConfig, service: Arc<Mutex<NewsService>>) -> Self {
        Self { config, service }
    }

    /// Parse and apply one command line.
    pub fn dispatch(&self, line: &str) -> NewsReply {
        match serde_json::from_str::<NewsCommand>(line) {
            Ok(cmd) => self.service.lock().handle(cmd),
            Err(e) => NewsReply::error(format!("Invalid command: {}", e)),
        }
    }

    /// Answer commands from `reader` on `writer` until `reader` hits EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read command line")?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply = self.dispatch(line);
            let mut out = serde_json::to_vec(&reply).context("Failed to serialise reply")?;
            out.push(b'\n');
            writer
                .write_all(&out)
                .await
                .context("Failed to write reply")?;
            writer.flush().await.context("Failed to flush reply")?;
        }
        Ok(())
    }

    /// Serve stdin/stdout with a background flush loop until EOF or SIGINT.
    pub async fn run(self) -> Result<()> {
        info!(
            "NewsAgent active – flushing every {:?}",
            self.config.flush_interval
        );

        let flush_service = self.service.clone();
        let flush_every = self.config.flush_interval;
        let flush_handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(flush_every);
            loop {
                timer.tick().await;
                flush_service.lock().flush();
            }
        });

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        let outcome = tokio::select! {
            res = self.serve(stdin, stdout) => {
                info!("NewsAgent input closed");
                res
            }
            _ = tokio::signal::ctrl_c() => {
                info!("NewsAgent shutting down (SIGINT)");
                Ok(())
            }
        };

        flush_handle.abort();

        let mut svc = self.service.lock();
        svc.flush();
        let pending = svc.dirty_count();
        if pending > 0 {
            warn!("{} news feed(s) still dirty at shutdown", pending);
        }

        outcome
    }
}
