//! `NewsFeed` – the bounded, time-expiring, spatially-queryable event log.
//!
//! Every operation is synchronous and in-memory. Eviction is driven only by
//! appends (capacity trim) and by [`NewsFeed::latest_near`] (TTL prune);
//! there is no background timer, so [`NewsFeed::latest`] may still return
//! events past their TTL until a spatial query prunes them.

use crate::event::{NewsEvent, UNKNOWN_CREATED_AT};
use crate::types::{
    is_valid_zone_id, normalize_zone, now_ms, FeedLimits, FeedStats, PruneReport, ZonePos,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Append-only feed of world news for a single owner (world, region …).
///
/// Entries are kept in insertion order, which producers guarantee is also
/// chronological. The feed never re-sorts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    #[serde(default)]
    entries: Vec<NewsEvent>,
    #[serde(skip)]
    limits: FeedLimits,
    #[serde(skip)]
    dirty: bool,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `limits`, trimming the oldest events if the feed is over the
    /// new capacity.
    pub fn with_limits(mut self, limits: FeedLimits) -> Self {
        self.set_limits(limits);
        self
    }

    pub fn limits(&self) -> FeedLimits {
        self.limits
    }

    /// Replace the retention policy. Capacity applies immediately; the TTL
    /// on the next prune.
    pub fn set_limits(&mut self, limits: FeedLimits) {
        self.limits = limits;
        if self.trim_to_capacity() > 0 {
            self.dirty = true;
        }
    }

    // -----------------------------------------------------------------------
    // Append
    // -----------------------------------------------------------------------

    /// Record an event.
    ///
    /// Blank `text` is dropped silently. A blank `zone_id` becomes
    /// [`DEFAULT_ZONE`](crate::types::DEFAULT_ZONE); a non-positive
    /// `created_at_ms` becomes the current time.
    pub fn add(
        &mut self,
        tick: i64,
        text: &str,
        zone_id: &str,
        x: i32,
        z: i32,
        created_at_ms: i64,
    ) {
        if text.trim().is_empty() {
            return;
        }

        let zone_id = normalize_zone(zone_id);
        if !is_valid_zone_id(&zone_id) {
            debug!("Storing news event with malformed zone id '{}'", zone_id);
        }

        let created_at_ms = if created_at_ms <= 0 {
            now_ms()
        } else {
            created_at_ms
        };

        self.entries.push(NewsEvent {
            tick,
            text: text.to_string(),
            zone_id,
            x,
            z,
            created_at_ms,
        });
        self.trim_to_capacity();
        self.dirty = true;
    }

    /// Record an event with no location: default zone, origin, stamped now.
    pub fn add_legacy(&mut self, tick: i64, text: &str) {
        let origin = ZonePos::origin();
        self.add(tick, text, &origin.zone_id, origin.x, origin.z, UNKNOWN_CREATED_AT);
    }

    /// Record an event at the caller's current location, stamped now.
    pub fn add_at(&mut self, tick: i64, text: &str, pos: &ZonePos) {
        self.add(tick, text, &pos.zone_id, pos.x, pos.z, UNKNOWN_CREATED_AT);
    }

    /// Put `older` in front of the current entries, as if it had been
    /// recorded first, then trim to capacity.
    ///
    /// Used when a stored history becomes readable after events were
    /// already recorded on top of an empty feed.
    pub fn merge_older(&mut self, older: NewsFeed) {
        if older.is_empty() {
            return;
        }
        let newer = std::mem::replace(&mut self.entries, older.entries);
        self.entries.extend(newer);
        self.trim_to_capacity();
        self.dirty = true;
    }

    fn trim_to_capacity(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.limits.max_entries);
        if excess > 0 {
            self.entries.drain(..excess);
            debug!("Trimmed {} news event(s) over capacity", excess);
        }
        excess
    }

    // -----------------------------------------------------------------------
    // Prune
    // -----------------------------------------------------------------------

    /// Stamp unknown timestamps with `now_ms`, then drop every event older
    /// than the TTL. An event aged exactly the TTL survives.
    pub fn prune_expired(&mut self, now_ms: i64) -> PruneReport {
        let mut report = PruneReport::default();

        for ev in self.entries.iter_mut().filter(|ev| ev.has_unknown_age()) {
            ev.created_at_ms = now_ms;
            report.healed += 1;
        }

        let ttl_ms = self.limits.ttl_ms;
        let before = self.entries.len();
        self.entries.retain(|ev| ev.age_ms(now_ms) <= ttl_ms);
        report.expired = before - self.entries.len();

        if report.changed() {
            debug!(
                "Pruned news feed: {} healed, {} expired, {} remain",
                report.healed,
                report.expired,
                self.entries.len()
            );
            self.dirty = true;
        }
        report
    }

    pub fn prune_expired_now(&mut self) -> PruneReport {
        self.prune_expired(now_ms())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The most recent `limit` events, oldest first. Does not prune.
    pub fn latest(&self, limit: usize) -> Vec<NewsEvent> {
        let start = self.entries.len().saturating_sub(limit);
        self.entries[start..].to_vec()
    }

    /// Up to `limit` events in `anchor_zone_id` within `radius_blocks` of
    /// `(ax, az)`, **newest first**. Prunes expired events before scanning.
    pub fn latest_near(
        &mut self,
        anchor_zone_id: &str,
        ax: i32,
        az: i32,
        radius_blocks: i32,
        limit: usize,
    ) -> Vec<NewsEvent> {
        self.latest_near_at(now_ms(), anchor_zone_id, ax, az, radius_blocks, limit)
    }

    /// [`latest_near`](Self::latest_near) with an explicit clock.
    pub fn latest_near_at(
        &mut self,
        now_ms: i64,
        anchor_zone_id: &str,
        ax: i32,
        az: i32,
        radius_blocks: i32,
        limit: usize,
    ) -> Vec<NewsEvent> {
        self.prune_expired(now_ms);

        if limit == 0 {
            return Vec::new();
        }

        let zone = normalize_zone(anchor_zone_id);
        let radius = i64::from(radius_blocks);
        let radius_sq = radius * radius;

        self.entries
            .iter()
            .rev()
            .filter(|ev| ev.zone_id == zone && ev.distance_sq(ax, az) <= radius_sq)
            .take(limit)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of every stored event, oldest first.
    pub fn entries(&self) -> &[NewsEvent] {
        &self.entries
    }

    /// True when the feed changed since it was last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the persistence layer after a successful save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            entries: self.entries.len(),
            oldest_tick: self.entries.first().map(|ev| ev.tick),
            newest_tick: self.entries.last().map(|ev| ev.tick),
        }
    }
}
