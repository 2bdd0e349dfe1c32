//! Persistence boundary: where feeds come from and where dirty feeds go.
//!
//! The feed never touches storage itself. A [`FeedRegistry`] hands out one
//! [`NewsFeed`] per owner, creating it on first access from whatever the
//! [`FeedStore`] holds, and writes back only the feeds whose dirty flag is
//! raised.

use crate::error::{FeedError, FeedResult};
use crate::feed::NewsFeed;
use crate::types::FeedLimits;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Durable storage for feeds, keyed by owner.
pub trait FeedStore: Send {
    /// Load the stored feed for `owner`, or `None` if nothing was saved yet.
    fn load(&self, owner: &str) -> FeedResult<Option<NewsFeed>>;
    fn save(&mut self, owner: &str, feed: &NewsFeed) -> FeedResult<()>;
}

impl<S: FeedStore + ?Sized> FeedStore for Box<S> {
    fn load(&self, owner: &str) -> FeedResult<Option<NewsFeed>> {
        (**self).load(owner)
    }

    fn save(&mut self, owner: &str, feed: &NewsFeed) -> FeedResult<()> {
        (**self).save(owner, feed)
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// One pretty-printed JSON file per owner under `root`.
///
/// Owner keys such as `minecraft:the_nether` are not safe file names, so
/// files are named after the MD5 of the key.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, owner: &str) -> PathBuf {
        let digest = md5::compute(owner.as_bytes());
        self.root.join(format!("news-{:x}.json", digest))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> FeedError {
    let path = path.to_path_buf();
    move |source| FeedError::Io { path, source }
}

impl FeedStore for JsonFileStore {
    fn load(&self, owner: &str) -> FeedResult<Option<NewsFeed>> {
        let path = self.path_for(owner);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&mut self, owner: &str, feed: &NewsFeed) -> FeedResult<()> {
        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;

        let path = self.path_for(owner);
        let tmp = path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(feed)?;

        fs::write(&tmp, payload).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        debug!("Saved news feed for '{}' to {}", owner, path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps serialized feeds in memory. Round-trips through JSON so that loads
/// behave exactly like a file-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw JSON document, e.g. one written by an
    /// older release.
    pub fn insert_raw(&mut self, owner: impl Into<String>, json: impl Into<String>) {
        self.docs.insert(owner.into(), json.into());
    }

    pub fn raw(&self, owner: &str) -> Option<&str> {
        self.docs.get(owner).map(String::as_str)
    }
}

impl FeedStore for MemoryStore {
    fn load(&self, owner: &str) -> FeedResult<Option<NewsFeed>> {
        match self.docs.get(owner) {
            Some(doc) => Ok(Some(serde_json::from_str(doc)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, owner: &str, feed: &NewsFeed) -> FeedResult<()> {
        let doc = serde_json::to_string(feed)?;
        self.docs.insert(owner.to_string(), doc);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Outcome of reading one owner's stored feed.
enum Loaded {
    Stored(NewsFeed),
    Missing,
    /// The document exists but does not decode; it is safe to overwrite.
    Corrupt,
    /// The store could not be read; what it holds is unknown.
    Unreachable,
}

/// Owns every live feed, keyed by owner.
pub struct FeedRegistry<S: FeedStore> {
    store: S,
    limits: FeedLimits,
    feeds: HashMap<String, NewsFeed>,
    /// Owners whose stored history could not be read. Their feeds are never
    /// saved until a later load succeeds and the history is merged back in.
    unread: HashSet<String>,
}

impl<S: FeedStore> FeedRegistry<S> {
    pub fn new(store: S, limits: FeedLimits) -> Self {
        Self {
            store,
            limits,
            feeds: HashMap::new(),
            unread: HashSet::new(),
        }
    }

    fn load(&self, owner: &str) -> Loaded {
        match self.store.load(owner) {
            Ok(Some(feed)) => {
                debug!("Loaded news feed for '{}' ({} entries)", owner, feed.len());
                Loaded::Stored(feed.with_limits(self.limits))
            }
            Ok(None) => Loaded::Missing,
            Err(e @ FeedError::Serialization(_)) => {
                warn!("Discarding undecodable news feed for '{}': {}", owner, e);
                Loaded::Corrupt
            }
            Err(e @ FeedError::Io { .. }) => {
                warn!("Cannot read news feed for '{}': {}", owner, e);
                Loaded::Unreachable
            }
        }
    }

    /// The feed for `owner`, loading or creating it on first access.
    ///
    /// An undecodable document is replaced by an empty feed that the next
    /// flush overwrites. A document that cannot be read at all also yields an
    /// empty feed, but that feed is held back from saving until the stored
    /// history is readable again.
    pub fn feed_mut(&mut self, owner: &str) -> &mut NewsFeed {
        if !self.feeds.contains_key(owner) {
            let feed = match self.load(owner) {
                Loaded::Stored(feed) => feed,
                Loaded::Missing | Loaded::Corrupt => NewsFeed::new().with_limits(self.limits),
                Loaded::Unreachable => {
                    self.unread.insert(owner.to_string());
                    NewsFeed::new().with_limits(self.limits)
                }
            };
            self.feeds.insert(owner.to_string(), feed);
        }
        self.feeds.entry(owner.to_string()).or_default()
    }

    /// The feed for `owner` if it is live or stored. Never creates one, so
    /// read-only lookups for unknown owners leave the registry unchanged.
    pub fn existing_mut(&mut self, owner: &str) -> Option<&mut NewsFeed> {
        if !self.feeds.contains_key(owner) {
            match self.load(owner) {
                Loaded::Stored(feed) => {
                    self.feeds.insert(owner.to_string(), feed);
                }
                Loaded::Missing | Loaded::Corrupt | Loaded::Unreachable => return None,
            }
        }
        self.feeds.get_mut(owner)
    }

    /// A feed that is already live. Does not touch the store.
    pub fn get(&self, owner: &str) -> Option<&NewsFeed> {
        self.feeds.get(owner)
    }

    /// Every live feed with its owner.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NewsFeed)> {
        self.feeds.iter().map(|(owner, feed)| (owner.as_str(), feed))
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.feeds.values().filter(|f| f.is_dirty()).count()
    }

    /// Owners whose feeds are held back because their history is unreadable.
    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }

    /// Retry loading every held-back owner, merging any recovered history
    /// under the events recorded since.
    fn recover_unread(&mut self) {
        let owners: Vec<String> = self.unread.iter().cloned().collect();
        for owner in owners {
            let recovered = match self.load(&owner) {
                Loaded::Stored(stored) => Some(stored),
                Loaded::Missing | Loaded::Corrupt => None,
                Loaded::Unreachable => continue,
            };
            if let (Some(stored), Some(feed)) = (recovered, self.feeds.get_mut(&owner)) {
                info!(
                    "Recovered {} stored news event(s) for '{}'",
                    stored.len(),
                    owner
                );
                feed.merge_older(stored);
            }
            self.unread.remove(&owner);
        }
    }

    /// Save every dirty feed. A feed whose save fails stays dirty so the
    /// next flush retries it, and a feed whose stored history is unreadable
    /// is not saved at all. Returns how many feeds were written.
    pub fn flush_dirty(&mut self) -> usize {
        self.recover_unread();

        let mut flushed = 0;
        let unread = &self.unread;
        let dirty = self
            .feeds
            .iter_mut()
            .filter(|(owner, f)| f.is_dirty() && !unread.contains(owner.as_str()));
        for (owner, feed) in dirty {
            match self.store.save(owner, feed) {
                Ok(()) => {
                    feed.mark_clean();
                    flushed += 1;
                }
                Err(e) => warn!("Failed to save news feed for '{}': {}", owner, e),
            }
        }
        flushed
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
