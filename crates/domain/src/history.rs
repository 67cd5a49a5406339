//! Session history store.
//!
//! A bounded, newest-first log of past roll results (or their redacted form)
//! shared by everyone at the table. Entries are never mutated after being
//! recorded; only a full reset removes them early. Nothing survives the
//! process.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roll::RollResult;

/// Maximum number of entries the store keeps.
pub const HISTORY_LIMIT: usize = 500;

/// What non-requesters observe of a hidden roll: who rolled, when, and that
/// the detail is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedRollResult {
    pub player_name: String,
    pub timestamp: DateTime<Utc>,
    /// Always true; the marker the table UI keys on.
    pub redacted: bool,
}

impl RollResult {
    /// Strip all outcome detail, keeping only name, timestamp and the marker.
    pub fn redacted(&self) -> RedactedRollResult {
        RedactedRollResult {
            player_name: self.player_name.clone(),
            timestamp: self.timestamp,
            redacted: true,
        }
    }
}

/// One stored or broadcast history item.
///
/// Untagged on the wire: a full result serializes with its counters, a
/// redacted one as the three-field marker form. Order matters for
/// deserialization - the full form is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    Roll(RollResult),
    Redacted(RedactedRollResult),
}

impl HistoryEntry {
    /// Display label of whoever produced this entry.
    pub fn player_name(&self) -> &str {
        match self {
            Self::Roll(r) => &r.player_name,
            Self::Redacted(r) => &r.player_name,
        }
    }
}

/// Append-biased, size-bounded, newest-first log of roll outcomes.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl SessionHistory {
    /// Create an empty store with the standard bound.
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Create an empty store with a custom bound.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Prepend an entry, evicting the oldest beyond the bound.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    /// The current entries, newest first. Used to bring a newly joined
    /// participant up to date.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Empty the store.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}
