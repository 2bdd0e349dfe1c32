//! The stored feed record and its persisted shape.
//!
//! Only `tick` and `text` are required on disk. Every later field carries a
//! default so that feeds written before the field existed still load:
//!
//! | Key           | Default                | Healed by                         |
//! |---------------|------------------------|-----------------------------------|
//! | `dim`         | [`DEFAULT_ZONE`]       | load (blank values too)           |
//! | `x`, `z`      | `0`                    | *(none)*                          |
//! | `createdAtMs` | `0` (unknown)          | [`NewsFeed::prune_expired`]       |
//!
//! [`NewsFeed::prune_expired`]: crate::feed::NewsFeed::prune_expired

use crate::types::{normalize_zone, ZonePos, DEFAULT_ZONE};
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp value meaning "created at an unknown time".
pub const UNKNOWN_CREATED_AT: i64 = 0;

/// A single timestamped, located line of world news.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsEvent {
    /// Game tick at creation.
    pub tick: i64,
    pub text: String,
    #[serde(
        rename = "dim",
        default = "default_zone",
        deserialize_with = "deserialize_zone"
    )]
    pub zone_id: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub z: i32,
    /// Wall-clock creation time in ms since epoch; [`UNKNOWN_CREATED_AT`]
    /// until a prune pass assigns one.
    #[serde(rename = "createdAtMs", default)]
    pub created_at_ms: i64,
}

impl NewsEvent {
    pub fn position(&self) -> ZonePos {
        ZonePos::new(self.zone_id.clone(), self.x, self.z)
    }

    /// Whether the creation time is still the unknown sentinel.
    pub fn has_unknown_age(&self) -> bool {
        self.created_at_ms == UNKNOWN_CREATED_AT
    }

    /// Age at `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    /// Squared horizontal distance to `(x, z)` in `i64`. Saturates at
    /// `i64::MAX` for points on opposite edges of the `i32` range.
    pub fn distance_sq(&self, x: i32, z: i32) -> i64 {
        let dx = i64::from(self.x) - i64::from(x);
        let dz = i64::from(self.z) - i64::from(z);
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

fn default_zone() -> String {
    DEFAULT_ZONE.to_string()
}

fn deserialize_zone<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_zone(raw.as_deref().unwrap_or_default()))
}
