//! `NewsCache` – a consumer's local copy of the last news it was sent.
//!
//! One cache per session/connection, owned by whatever renders it and
//! updated explicitly through [`NewsCache::apply`]. Nothing here is global.

use crate::protocol::NewsLines;

#[derive(Debug, Default, Clone)]
pub struct NewsCache {
    lines: Vec<String>,
    /// Frame of the most recent update applied.
    last_frame: Option<u64>,
}

impl NewsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached lines with `update` stamped at `frame`.
    ///
    /// Updates older than the last applied frame are ignored so that a late
    /// reply cannot overwrite fresher news. Returns whether it was applied.
    pub fn apply(&mut self, frame: u64, update: NewsLines) -> bool {
        if self.last_frame.is_some_and(|last| frame < last) {
            return false;
        }
        self.lines = update.lines;
        self.last_frame = Some(frame);
        true
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_frame = None;
    }
}
