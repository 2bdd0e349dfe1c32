//! `news.*` wire protocol.
//!
//! Every message that crosses the boundary between the feed host and its
//! consumers (game server, chat relay, web dashboard…) lives here.
//!
//! ## Channel namespaces
//!
//! | Namespace    | Direction          | Payload              |
//! |--------------|--------------------|----------------------|
//! | `news.cmd.*` | consumer → host    | [`NewsCommand`]      |
//! | `news.lines` | host → consumer    | [`NewsLines`]        |
//!
//! ## Design rules
//!
//! 1. Every struct is `Serialize + Deserialize` with snake_case JSON.
//! 2. Commands are tagged by `cmd`, replies by `status`.
//! 3. Lines are always sent in display order (oldest first).
//! 4. Optional location fields default the same way the feed does.

use crate::event::NewsEvent;
use crate::types::FeedStats;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commands  (consumer → host)
// ---------------------------------------------------------------------------

/// A request handled by the news host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum NewsCommand {
    /// Record an event in `owner`'s feed.
    Record {
        owner: String,
        tick: i64,
        text: String,
        #[serde(default)]
        dim: String,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        z: i32,
        /// `0` or absent means "now".
        #[serde(default)]
        created_at_ms: i64,
    },
    /// Most recent events regardless of location or age.
    Latest { owner: String, limit: usize },
    /// Most recent events near a point (prunes first).
    Near {
        owner: String,
        #[serde(default)]
        dim: String,
        x: i32,
        z: i32,
        radius: i32,
        limit: usize,
    },
    /// Force a prune pass on `owner`'s feed.
    Prune { owner: String },
    /// Host-wide statistics.
    Stats,
    /// Save every dirty feed now.
    Flush,
}

// ---------------------------------------------------------------------------
// Replies  (host → consumer)
// ---------------------------------------------------------------------------

/// News lines packaged for remote display, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsLines {
    pub lines: Vec<String>,
}

impl NewsLines {
    /// From a forward-ordered result such as [`NewsFeed::latest`].
    ///
    /// [`NewsFeed::latest`]: crate::feed::NewsFeed::latest
    pub fn from_events(events: &[NewsEvent]) -> Self {
        Self {
            lines: events.iter().map(|ev| ev.text.clone()).collect(),
        }
    }

    /// From a newest-first result such as [`NewsFeed::latest_near`],
    /// reversed into display order.
    ///
    /// [`NewsFeed::latest_near`]: crate::feed::NewsFeed::latest_near
    pub fn from_events_newest_first(events: &[NewsEvent]) -> Self {
        Self {
            lines: events.iter().rev().map(|ev| ev.text.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Host-wide counters returned by [`NewsCommand::Stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStats {
    pub feeds: usize,
    pub dirty_feeds: usize,
    pub total_entries: usize,
    pub total_flushes: u64,
    /// Per-owner breakdown, sorted by owner.
    pub per_owner: Vec<(String, FeedStats)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NewsReply {
    Lines(NewsLines),
    Ok,
    Pruned { healed: usize, expired: usize },
    Flushed { feeds: usize },
    Stats(HostStats),
    Error { message: String },
}

impl NewsReply {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subject helpers
// ---------------------------------------------------------------------------

/// Bus subjects for hosts that route news over a message bus.
pub mod subjects {
    pub const LINES: &str = "news.lines";

    pub const CMD_RECORD: &str = "news.cmd.record";
    pub const CMD_LATEST: &str = "news.cmd.latest";
    pub const CMD_NEAR: &str = "news.cmd.near";
    pub const CMD_PRUNE: &str = "news.cmd.prune";
    pub const CMD_STATS: &str = "news.cmd.stats";
    pub const CMD_FLUSH: &str = "news.cmd.flush";
}

impl NewsCommand {
    /// The bus subject this command is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Record { .. } => subjects::CMD_RECORD,
            Self::Latest { .. } => subjects::CMD_LATEST,
            Self::Near { .. } => subjects::CMD_NEAR,
            Self::Prune { .. } => subjects::CMD_PRUNE,
            Self::Stats => subjects::CMD_STATS,
            Self::Flush => subjects::CMD_FLUSH,
        }
    }
}
