//! NewsService – per-owner feeds, command dispatch, dirty flushing.

use crate::event::UNKNOWN_CREATED_AT;
use crate::protocol::{HostStats, NewsCommand, NewsLines, NewsReply};
use crate::store::{FeedRegistry, FeedStore};
use crate::types::FeedLimits;
use log::{debug, info};

pub struct NewsService {
    registry: FeedRegistry<Box<dyn FeedStore>>,
    total_flushes: u64,
}

impl NewsService {
    pub fn new(store: Box<dyn FeedStore>, limits: FeedLimits) -> Self {
        Self {
            registry: FeedRegistry::new(store, limits),
            total_flushes: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Command dispatch
    // -----------------------------------------------------------------------

    /// Apply a single command and build its reply.
    pub fn handle(&mut self, cmd: NewsCommand) -> NewsReply {
        debug!("Handling {}", cmd.subject());
        match cmd {
            NewsCommand::Record {
                owner,
                tick,
                text,
                dim,
                x,
                z,
                created_at_ms,
            } => {
                self.registry
                    .feed_mut(&owner)
                    .add(tick, &text, &dim, x, z, created_at_ms);
                NewsReply::Ok
            }
            NewsCommand::Latest { owner, limit } => NewsReply::Lines(self.latest(&owner, limit)),
            NewsCommand::Near {
                owner,
                dim,
                x,
                z,
                radius,
                limit,
            } => NewsReply::Lines(self.near(&owner, &dim, x, z, radius, limit)),
            NewsCommand::Prune { owner } => {
                let report = self
                    .registry
                    .existing_mut(&owner)
                    .map(|feed| feed.prune_expired_now())
                    .unwrap_or_default();
                NewsReply::Pruned {
                    healed: report.healed,
                    expired: report.expired,
                }
            }
            NewsCommand::Stats => NewsReply::Stats(self.stats()),
            NewsCommand::Flush => NewsReply::Flushed {
                feeds: self.flush(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Feed access
    // -----------------------------------------------------------------------

    /// Record an untimed event for `owner` (stamped now).
    pub fn record(&mut self, owner: &str, tick: i64, text: &str, dim: &str, x: i32, z: i32) {
        self.registry
            .feed_mut(owner)
            .add(tick, text, dim, x, z, UNKNOWN_CREATED_AT);
    }

    /// Queries never create a feed: an owner with no live or stored feed
    /// gets empty lines.
    pub fn latest(&mut self, owner: &str, limit: usize) -> NewsLines {
        match self.registry.existing_mut(owner) {
            Some(feed) => NewsLines::from_events(&feed.latest(limit)),
            None => NewsLines::default(),
        }
    }

    pub fn near(
        &mut self,
        owner: &str,
        dim: &str,
        x: i32,
        z: i32,
        radius: i32,
        limit: usize,
    ) -> NewsLines {
        match self.registry.existing_mut(owner) {
            Some(feed) => {
                NewsLines::from_events_newest_first(&feed.latest_near(dim, x, z, radius, limit))
            }
            None => NewsLines::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save every dirty feed. Returns how many were written.
    pub fn flush(&mut self) -> usize {
        let flushed = self.registry.flush_dirty();
        if flushed > 0 {
            self.total_flushes += flushed as u64;
            info!("Flushed {} news feed(s)", flushed);
        }
        flushed
    }

    pub fn dirty_count(&self) -> usize {
        self.registry.dirty_count()
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> HostStats {
        let mut per_owner: Vec<_> = self
            .registry
            .iter()
            .map(|(owner, feed)| (owner.to_string(), feed.stats()))
            .collect();
        per_owner.sort_by(|a, b| a.0.cmp(&b.0));

        HostStats {
            feeds: self.registry.len(),
            dirty_feeds: self.registry.dirty_count(),
            total_entries: per_owner.iter().map(|(_, s)| s.entries).sum(),
            total_flushes: self.total_flushes,
            per_owner,
        }
    }
}
