//! World News
//!
//! A bounded, time-expiring, spatially-queryable feed of world events, plus
//! the host plumbing that loads, serves and saves one feed per owner.
//!
//! ## Architecture
//!
//! ```text
//! NewsAgent  (agent.rs)   ← line-delimited JSON commands, flush timer
//!   └── NewsService  (service.rs) ← command dispatch, per-owner feeds
//!         └── FeedRegistry  (store.rs) ← first-access load, dirty flush
//!               ├── FeedStore: JsonFileStore / MemoryStore
//!               └── NewsFeed  (feed.rs) ← capacity trim, TTL prune, queries
//!                     └── NewsEvent (event.rs)
//! ```
//!
//! `NewsFeed` is single-owner and lock-free; hosts that share it across
//! threads wrap the owning service in one mutex, as `NewsAgent` does.

// Feed, persistence and protocol types are always available.
pub mod cache;
pub mod error;
pub mod event;
pub mod feed;
pub mod protocol;
pub mod store;
pub mod types;

// Host modules require the `server` feature.
#[cfg(feature = "server")]
pub mod agent;
#[cfg(feature = "server")]
pub mod service;

// Convenience re-exports (server only)
#[cfg(feature = "server")]
pub use agent::{NewsAgent, NewsAgentConfig};
#[cfg(feature = "server")]
pub use service::NewsService;

pub use cache::NewsCache;
pub use error::{FeedError, FeedResult};
pub use event::NewsEvent;
pub use feed::NewsFeed;
pub use protocol::{NewsCommand, NewsLines, NewsReply};
pub use store::{FeedRegistry, FeedStore, JsonFileStore, MemoryStore};
pub use types::{FeedLimits, FeedStats, PruneReport, ZonePos, DEFAULT_ZONE, MAX_ENTRIES, TTL_MS};
