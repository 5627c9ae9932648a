//! The built-in component column groups.
//!
//! Every entity has all four groups; a class that doesn't use a field simply
//! leaves it at its default.  Row `i` across every column belongs to the same
//! entity — there is no sparse mapping anywhere in the store.

use crate::column::{AtomicF32Column, AtomicU32Column, Column, FlagColumn};

/// Collider shape tags for [`Collider::shape`].
pub mod shape {
    pub const CIRCLE: u8 = 0;
    pub const BOX: u8 = 1;
}

// ── Transform ─────────────────────────────────────────────────────────────────

/// Position, orientation, and liveness.
///
/// `x`/`y` and the previous-position pair are atomic because pair constraint
/// resolution nudges *both* endpoints of a penetrating pair, and the other
/// endpoint usually belongs to a different job.
pub struct Transform {
    /// 1 while the row is occupied.  The spawn pool claims rows by CAS here.
    pub active: FlagColumn,
    pub x: AtomicF32Column,
    pub y: AtomicF32Column,
    /// Verlet history — velocity is implicit in `(x - prev_x, y - prev_y)`.
    pub prev_x: AtomicF32Column,
    pub prev_y: AtomicF32Column,
    /// Heading in radians; held below the anti-jitter speed threshold.
    pub rotation: Column<f32>,
}

impl Transform {
    pub fn new(count: usize) -> Self {
        Self {
            active: FlagColumn::new(count),
            x: AtomicF32Column::new(count),
            y: AtomicF32Column::new(count),
            prev_x: AtomicF32Column::new(count),
            prev_y: AtomicF32Column::new(count),
            rotation: Column::new(count),
        }
    }

    /// Restore one row to the zero image (does not touch `active`).
    pub fn reset_row(&self, row: usize) {
        self.x.set(row, 0.0);
        self.y.set(row, 0.0);
        self.prev_x.set(row, 0.0);
        self.prev_y.set(row, 0.0);
        self.rotation.set(row, 0.0);
    }

    pub(crate) fn bytes_per_row() -> usize {
        1 + 5 * 4
    }
}

// ── RigidBody ─────────────────────────────────────────────────────────────────

/// Verlet integration state and per-body limits.  Written by the physics
/// phases; `ax`/`ay` are the one pair behaviors write each frame.
pub struct RigidBody {
    pub vx: Column<f32>,
    pub vy: Column<f32>,
    pub ax: Column<f32>,
    pub ay: Column<f32>,
    /// Per-axis displacement cap per frame.  `<= 0` means the default cap.
    pub max_vel: Column<f32>,
    pub max_acc: Column<f32>,
    pub friction: Column<f32>,
    /// Static bodies skip integration and forfeit their share of pair
    /// corrections.
    pub is_static: Column<u8>,
}

impl RigidBody {
    pub fn new(count: usize) -> Self {
        Self {
            vx: Column::new(count),
            vy: Column::new(count),
            ax: Column::new(count),
            ay: Column::new(count),
            max_vel: Column::new(count),
            max_acc: Column::new(count),
            friction: Column::new(count),
            is_static: Column::new(count),
        }
    }

    pub fn reset_row(&self, row: usize) {
        self.vx.set(row, 0.0);
        self.vy.set(row, 0.0);
        self.ax.set(row, 0.0);
        self.ay.set(row, 0.0);
        self.max_vel.set(row, 0.0);
        self.max_acc.set(row, 0.0);
        self.friction.set(row, 0.0);
        self.is_static.set(row, 0);
    }

    pub(crate) fn bytes_per_row() -> usize {
        7 * 4 + 1
    }
}

// ── Collider ──────────────────────────────────────────────────────────────────

/// Collision geometry and filtering.
pub struct Collider {
    /// [`shape::CIRCLE`] or [`shape::BOX`].
    pub shape: Column<u8>,
    pub radius: Column<f32>,
    pub width: Column<f32>,
    pub height: Column<f32>,
    pub offset_x: Column<f32>,
    pub offset_y: Column<f32>,
    /// Triggers report contacts but skip positional correction.
    pub is_trigger: Column<u8>,
    pub restitution: Column<f32>,
    /// Broad-phase filter: pair `(i, j)` collides only when
    /// `(layer_i & mask_j) != 0 && (layer_j & mask_i) != 0`.
    pub layer: Column<u16>,
    pub mask: Column<u16>,
    pub aabb_min_x: Column<f32>,
    pub aabb_min_y: Column<f32>,
    pub aabb_max_x: Column<f32>,
    pub aabb_max_y: Column<f32>,
    /// Neighbor-search radius.  0 disables neighbor queries for the row.
    pub visual_range: Column<f32>,
    /// Contacts resolved against this row, cumulative.  Atomic: both jobs of
    /// a pair increment it.
    pub collision_count: AtomicU32Column,
}

impl Collider {
    pub fn new(count: usize) -> Self {
        Self {
            shape: Column::new(count),
            radius: Column::new(count),
            width: Column::new(count),
            height: Column::new(count),
            offset_x: Column::new(count),
            offset_y: Column::new(count),
            is_trigger: Column::new(count),
            restitution: Column::new(count),
            layer: Column::new(count),
            mask: Column::new(count),
            aabb_min_x: Column::new(count),
            aabb_min_y: Column::new(count),
            aabb_max_x: Column::new(count),
            aabb_max_y: Column::new(count),
            visual_range: Column::new(count),
            collision_count: AtomicU32Column::new(count),
        }
    }

    /// Per-axis collision half-extent: radius for circles, half width/height
    /// for boxes.
    #[inline]
    pub fn half_extents(&self, row: usize) -> (f32, f32) {
        if self.shape.get(row) == shape::BOX {
            (self.width.get(row) * 0.5, self.height.get(row) * 0.5)
        } else {
            let r = self.radius.get(row);
            (r, r)
        }
    }

    pub fn reset_row(&self, row: usize) {
        self.shape.set(row, 0);
        self.radius.set(row, 0.0);
        self.width.set(row, 0.0);
        self.height.set(row, 0.0);
        self.offset_x.set(row, 0.0);
        self.offset_y.set(row, 0.0);
        self.is_trigger.set(row, 0);
        self.restitution.set(row, 0.0);
        self.layer.set(row, 0);
        self.mask.set(row, 0);
        self.aabb_min_x.set(row, 0.0);
        self.aabb_min_y.set(row, 0.0);
        self.aabb_max_x.set(row, 0.0);
        self.aabb_max_y.set(row, 0.0);
        self.visual_range.set(row, 0.0);
        self.collision_count.set(row, 0);
    }

    pub(crate) fn bytes_per_row() -> usize {
        2 * 1 + 11 * 4 + 2 * 2 + 4
    }
}

// ── SpriteRenderer ────────────────────────────────────────────────────────────

/// Columns the external renderer reads.  The core recomputes the visibility
/// trio in the publish phase; everything else is entity-owned styling.
pub struct SpriteRenderer {
    /// Packed 0xRRGGBBAA.
    pub tint: Column<u32>,
    pub alpha: Column<f32>,
    pub scale_x: Column<f32>,
    pub scale_y: Column<f32>,
    pub render_visible: Column<u8>,
    pub on_screen: Column<u8>,
    pub z_offset: Column<f32>,
    /// Set when the row moved this frame; the renderer may use it to skip
    /// stationary sprites.
    pub render_dirty: Column<u8>,
}

impl SpriteRenderer {
    pub fn new(count: usize) -> Self {
        Self {
            tint: Column::new(count),
            alpha: Column::new(count),
            scale_x: Column::new(count),
            scale_y: Column::new(count),
            render_visible: Column::new(count),
            on_screen: Column::new(count),
            z_offset: Column::new(count),
            render_dirty: Column::new(count),
        }
    }

    pub fn reset_row(&self, row: usize) {
        self.tint.set(row, 0);
        self.alpha.set(row, 0.0);
        self.scale_x.set(row, 0.0);
        self.scale_y.set(row, 0.0);
        self.render_visible.set(row, 0);
        self.on_screen.set(row, 0);
        self.z_offset.set(row, 0.0);
        self.render_dirty.set(row, 0);
    }

    pub(crate) fn bytes_per_row() -> usize {
        4 + 4 * 4 + 3 * 1
    }
}
