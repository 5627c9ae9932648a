//! The per-entity neighbor table.
//!
//! Two parallel stride-`1+K` columns hold, for each entity, up to K neighbor
//! rows and their squared distances.  Slot 0 of each row's stripe is the
//! count.  The table is rewritten from scratch by every spatial phase — it is
//! a view of the grid at rebuild time, not persistent state — and read-only
//! everywhere else in the frame.

use swarm_core::EntityId;

use crate::column::Column;

/// Columnar neighbor/distance storage, stride `1 + max_neighbors`.
pub struct NeighborTable {
    ids: Column<u32>,
    dist_sq: Column<f32>,
    count: usize,
    max_neighbors: usize,
}

impl NeighborTable {
    pub fn new(count: usize, max_neighbors: usize) -> Self {
        let stride = 1 + max_neighbors;
        Self {
            ids: Column::new(count * stride),
            dist_sq: Column::new(count * stride),
            count,
            max_neighbors,
        }
    }

    /// K — the per-entity neighbor cap.
    #[inline(always)]
    pub fn max_neighbors(&self) -> usize {
        self.max_neighbors
    }

    #[inline(always)]
    fn base(&self, row: usize) -> usize {
        row * (1 + self.max_neighbors)
    }

    /// Overwrite row `row`'s stripe with `entries` (at most K, enforced by
    /// the writer).  Only the spatial phase calls this, for rows it owns.
    pub fn publish_row(&self, row: usize, entries: &[(u32, f32)]) {
        let base = self.base(row);
        debug_assert!(entries.len() <= self.max_neighbors);
        self.ids.set(base, entries.len() as u32);
        for (slot, &(id, d2)) in entries.iter().enumerate() {
            self.ids.set(base + 1 + slot, id);
            self.dist_sq.set(base + 1 + slot, d2);
        }
    }

    /// Number of neighbors recorded for `row` this frame.
    #[inline]
    pub fn neighbor_count(&self, row: usize) -> usize {
        self.ids.get(self.base(row)) as usize
    }

    /// Iterate row `row`'s `(neighbor, distance²)` pairs, ascending by
    /// neighbor index.
    pub fn neighbors(&self, row: usize) -> impl Iterator<Item = (EntityId, f32)> + '_ {
        let base = self.base(row);
        let n = self.neighbor_count(row).min(self.max_neighbors);
        (0..n).map(move |slot| {
            (
                EntityId(self.ids.get(base + 1 + slot)),
                self.dist_sq.get(base + 1 + slot),
            )
        })
    }

    pub(crate) fn bytes(&self) -> usize {
        self.count * (1 + self.max_neighbors) * 8
    }
}
