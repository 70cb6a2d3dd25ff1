//! Committed-footprint tracking and overlap queries.
//!
//! The occupancy set is append-only for the duration of one planning pass:
//! the planner never backtracks, so nothing is ever removed. A fresh tracker
//! is built per invocation of [`plan`](crate::plan).

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::OVERLAP_MARGIN;

/// An axis-aligned footprint, stored as center plus half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    /// Center of the footprint.
    pub center: Vec2,
    /// Half extents along each axis.
    pub half: Vec2,
}

impl Footprint {
    /// Creates a footprint from center and half extents.
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Footprint of a sprite with the given unscaled base size, shrunk by
    /// the overlap margin on each half-extent.
    pub fn from_scaled(center: Vec2, base: Vec2, scale: Vec2) -> Self {
        Self {
            center,
            half: base * scale / 2.0 - Vec2::splat(OVERLAP_MARGIN),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Strict AABB intersection test. Touching edges do not overlap.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.center.x - self.half.x < other.center.x + other.half.x
            && self.center.x + self.half.x > other.center.x - other.half.x
            && self.center.y - self.half.y < other.center.y + other.half.y
            && self.center.y + self.half.y > other.center.y - other.half.y
    }
}

/// Append-only set of footprints committed during one planning pass.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    committed: Vec<Footprint>,
}

impl Occupancy {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the candidate footprint overlaps any committed footprint.
    pub fn overlaps(&self, candidate: &Footprint) -> bool {
        self.committed.iter().any(|b| b.overlaps(candidate))
    }

    /// Commits a footprint. Committed footprints are never removed.
    pub fn commit(&mut self, footprint: Footprint) {
        self.committed.push(footprint);
    }

    /// All committed footprints, in commit order.
    pub fn footprints(&self) -> &[Footprint] {
        &self.committed
    }

    /// Number of committed footprints.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// True if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}
