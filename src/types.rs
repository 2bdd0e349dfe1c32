//! Core feed types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Zone every event falls back to when the producer supplies none.
pub const DEFAULT_ZONE: &str = "minecraft:overworld";

/// Namespace implied by a zone id written without one (`"the_nether"`).
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Substitute [`DEFAULT_ZONE`] for an empty or all-whitespace zone id.
///
/// Non-blank ids are returned verbatim, even when [`is_valid_zone_id`]
/// rejects them.
pub fn normalize_zone(zone_id: &str) -> String {
    if zone_id.trim().is_empty() {
        DEFAULT_ZONE.to_string()
    } else {
        zone_id.to_string()
    }
}

/// Check a zone id against the `namespace:path` resource-location format.
///
/// Namespace characters are `a-z 0-9 _ - .`; the path additionally allows
/// `/`. A bare path (no `:`) is read as `minecraft:<path>`.
pub fn is_valid_zone_id(zone_id: &str) -> bool {
    let (namespace, path) = match zone_id.split_once(':') {
        Some((ns, path)) => (ns, path),
        None => (DEFAULT_NAMESPACE, zone_id),
    };

    let ns_ok = namespace
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.'));
    let path_ok = !path.is_empty()
        && path
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'/'));

    ns_ok && path_ok
}

/// A caller's current location: the zone it stands in plus block X/Z.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZonePos {
    pub zone_id: String,
    pub x: i32,
    pub z: i32,
}

impl ZonePos {
    pub fn new(zone_id: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            zone_id: zone_id.into(),
            x,
            z,
        }
    }

    /// The world origin in [`DEFAULT_ZONE`].
    pub fn origin() -> Self {
        Self::new(DEFAULT_ZONE, 0, 0)
    }
}

impl std::fmt::Display for ZonePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@[{},{}]", self.zone_id, self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Limits & stats
// ---------------------------------------------------------------------------

/// Maximum number of events a feed retains.
pub const MAX_ENTRIES: usize = 400;

/// Maximum event age before it becomes eligible for removal (3 hours).
pub const TTL_MS: i64 = 3 * 60 * 60 * 1000;

/// Retention policy applied to a feed. Runtime configuration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLimits {
    /// Events kept before the oldest are trimmed.
    pub max_entries: usize,
    /// Age in milliseconds past which an event expires.
    pub ttl_ms: i64,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            ttl_ms: TTL_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStats {
    pub entries: usize,
    pub oldest_tick: Option<i64>,
    pub newest_tick: Option<i64>,
}

/// What a single prune pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Events whose unknown timestamp was set to the prune time.
    pub healed: usize,
    /// Events removed for exceeding the TTL.
    pub expired: usize,
}

impl PruneReport {
    pub fn changed(&self) -> bool {
        self.healed > 0 || self.expired > 0
    }
}
