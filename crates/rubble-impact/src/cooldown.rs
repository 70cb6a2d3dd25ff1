//! Per-pair contact cooldown tracking.

use std::collections::HashMap;

use crate::body::BodyId;

/// Order-normalized identity of an unordered contact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: BodyId,
    hi: BodyId,
}

impl PairKey {
    /// Symmetric constructor: `PairKey::of(a, b) == PairKey::of(b, a)`.
    pub fn of(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

/// Timestamp store preventing re-processing of a contact pair within the
/// cooldown window.
///
/// Entries are never expired; staleness is handled by the time comparison
/// alone, so the ledger grows with the number of distinct pairs seen in a
/// session. A session is one level attempt and short-lived; the ledger is
/// discarded wholesale on session restart.
#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    last_hit: HashMap<PairKey, f64>,
}

impl CooldownLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the pair was recorded less than `window_ms` before `now_ms`.
    pub fn in_cooldown(&self, key: PairKey, now_ms: f64, window_ms: f64) -> bool {
        self.last_hit
            .get(&key)
            .map(|&last| now_ms - last < window_ms)
            .unwrap_or(false)
    }

    /// Records the pair at `now_ms`, overwriting any previous entry.
    pub fn record(&mut self, key: PairKey, now_ms: f64) {
        self.last_hit.insert(key, now_ms);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.last_hit.clear();
    }

    /// Number of distinct pairs ever recorded.
    pub fn len(&self) -> usize {
        self.last_hit.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.last_hit.is_empty()
    }
}
