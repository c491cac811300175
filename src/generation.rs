//! Structural-change tracking for fail-fast cursors.
//!
//! Every map carries a `MapId` (identity, fixed for its lifetime) and a
//! `Generation` (bumped on each structural change). A cursor snapshots both
//! and compares them before advancing.

use core::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a map instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MapId(u64);

impl MapId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        MapId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Modification counter. Value replacement does not count as a change.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Generation(u64);

impl Generation {
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn get(self) -> u64 {
        self.0
    }
}
