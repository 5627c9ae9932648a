//! `ComponentStore` — the arena that owns every column.
//!
//! One store holds all persistent simulation state for `count` entity rows:
//! the four built-in component groups, the `entity_type` tag column, the
//! per-frame neighbor table and pair buffer, and any user component columns.
//! It is allocated once, before worker threads exist, and shared by `&`
//! reference (through an `Arc` held by the orchestrator) for the lifetime of
//! the run.

use swarm_core::Vec2;

use crate::column::Column;
use crate::components::{Collider, RigidBody, SpriteRenderer, Transform};
use crate::error::{StoreError, StoreResult};
use crate::neighbors::NeighborTable;
use crate::pairs::PairBuffer;
use crate::user::UserComponents;

/// Structure-of-Arrays storage for all entity state.
///
/// Row `i` across every column belongs to entity `i`; the row index is the
/// entity's identity (there is no separate handle type beyond `EntityId`).
pub struct ComponentStore {
    /// Total entity rows.  Equals the length of every column.
    count: usize,

    pub transform: Transform,
    pub body: RigidBody,
    pub collider: Collider,
    pub sprite: SpriteRenderer,

    /// Numeric class tag per row.  Written once at startup, constant after.
    pub entity_type: Column<u16>,

    /// Neighbor lists, rewritten each spatial phase.
    pub neighbors: NeighborTable,

    /// Overlap pairs recorded each spatial phase.
    pub pairs: PairBuffer,

    user: UserComponents,
}

impl ComponentStore {
    pub fn new(count: usize, max_neighbors: usize, max_pairs: u32) -> Self {
        Self {
            count,
            transform: Transform::new(count),
            body: RigidBody::new(count),
            collider: Collider::new(count),
            sprite: SpriteRenderer::new(count),
            entity_type: Column::new(count),
            neighbors: NeighborTable::new(count, max_neighbors),
            pairs: PairBuffer::new(max_pairs),
            user: UserComponents::new(),
        }
    }

    /// Total entity rows (N).
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Validate a row index at the API boundary.
    #[inline]
    pub fn check_row(&self, row: usize) -> StoreResult<()> {
        if row < self.count {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange { row, count: self.count })
        }
    }

    /// `true` while the row is occupied.
    #[inline(always)]
    pub fn is_active(&self, row: usize) -> bool {
        self.transform.active.get(row) != 0
    }

    /// Number of occupied rows in the whole store.
    pub fn active_count(&self) -> usize {
        self.transform.active.count_set(0..self.count)
    }

    #[inline]
    pub fn position(&self, row: usize) -> Vec2 {
        Vec2::new(self.transform.x.get(row), self.transform.y.get(row))
    }

    /// Set position and clear the Verlet history to it (no implied velocity).
    pub fn place(&self, row: usize, pos: Vec2) {
        self.transform.x.set(row, pos.x);
        self.transform.y.set(row, pos.y);
        self.transform.prev_x.set(row, pos.x);
        self.transform.prev_y.set(row, pos.y);
    }

    #[inline]
    pub fn velocity(&self, row: usize) -> Vec2 {
        Vec2::new(self.body.vx.get(row), self.body.vy.get(row))
    }

    // ── User components ───────────────────────────────────────────────────

    pub fn user(&self) -> &UserComponents {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut UserComponents {
        &mut self.user
    }

    /// Shorthand for `user().column::<T>()`.
    pub fn user_column<T: Copy + Default + Send + Sync + 'static>(
        &self,
    ) -> StoreResult<&Column<T>> {
        self.user.column::<T>()
    }

    // ── Lifecycle helpers ─────────────────────────────────────────────────

    /// Restore every column of `row` to the zero/default image.  `active`
    /// and `entity_type` are untouched — the caller owns the flag transition
    /// and the type tag is constant for the process lifetime.
    pub fn reset_row(&self, row: usize) {
        self.transform.reset_row(row);
        self.body.reset_row(row);
        self.collider.reset_row(row);
        self.sprite.reset_row(row);
        self.user.reset_row(row);
    }

    /// Exact byte requirement of the built-in persistent columns for this
    /// store's capacity (sum of field widths × rows, plus the neighbor and
    /// pair stripes).
    pub fn buffer_bytes(&self) -> usize {
        let per_row = Transform::bytes_per_row()
            + RigidBody::bytes_per_row()
            + Collider::bytes_per_row()
            + SpriteRenderer::bytes_per_row()
            + 2; // entity_type
        self.count * per_row + self.neighbors.bytes() + self.pairs.bytes()
    }
}
