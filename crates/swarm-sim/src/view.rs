//! The read-only renderer view and the publish-phase column refresh.
//!
//! The external renderer never gets callbacks: after the last phase of every
//! frame it may read the transform, sprite, and entity-type columns directly
//! through [`RenderView`].  The publish pass recomputes the visibility trio
//! (`on_screen`, `render_visible`, `render_dirty`) as part of the frame, so
//! the renderer does no world-space math of its own.

use std::ops::Range;

use swarm_store::ComponentStore;

/// Read-only borrow of the columns the renderer consumes.
pub struct RenderView<'a> {
    store: &'a ComponentStore,
}

impl<'a> RenderView<'a> {
    pub(crate) fn new(store: &'a ComponentStore) -> Self {
        Self { store }
    }

    /// Total rows (active or not).
    pub fn len(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.count() == 0
    }

    #[inline]
    pub fn active(&self, row: usize) -> bool {
        self.store.is_active(row)
    }

    #[inline]
    pub fn x(&self, row: usize) -> f32 {
        self.store.transform.x.get(row)
    }

    #[inline]
    pub fn y(&self, row: usize) -> f32 {
        self.store.transform.y.get(row)
    }

    #[inline]
    pub fn rotation(&self, row: usize) -> f32 {
        self.store.transform.rotation.get(row)
    }

    #[inline]
    pub fn entity_type(&self, row: usize) -> u16 {
        self.store.entity_type.get(row)
    }

    #[inline]
    pub fn tint(&self, row: usize) -> u32 {
        self.store.sprite.tint.get(row)
    }

    #[inline]
    pub fn alpha(&self, row: usize) -> f32 {
        self.store.sprite.alpha.get(row)
    }

    #[inline]
    pub fn scale(&self, row: usize) -> (f32, f32) {
        (self.store.sprite.scale_x.get(row), self.store.sprite.scale_y.get(row))
    }

    #[inline]
    pub fn z_offset(&self, row: usize) -> f32 {
        self.store.sprite.z_offset.get(row)
    }

    #[inline]
    pub fn render_visible(&self, row: usize) -> bool {
        self.store.sprite.render_visible.get(row) != 0
    }

    #[inline]
    pub fn on_screen(&self, row: usize) -> bool {
        self.store.sprite.on_screen.get(row) != 0
    }

    #[inline]
    pub fn render_dirty(&self, row: usize) -> bool {
        self.store.sprite.render_dirty.get(row) != 0
    }

    /// Rows worth drawing this frame: active, visible, and on screen.
    pub fn drawable_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.store.count())
            .filter(move |&row| self.active(row) && self.render_visible(row) && self.on_screen(row))
    }
}

/// Refresh the render-view columns for `range`.  Runs inside the publish
/// phase, after the AABBs have been re-derived.
pub(crate) fn publish_range(
    store: &ComponentStore,
    canvas_width: f32,
    canvas_height: f32,
    range: Range<u32>,
) {
    for row in range {
        let i = row as usize;
        if !store.is_active(i) {
            store.sprite.on_screen.set(i, 0);
            store.sprite.render_dirty.set(i, 0);
            continue;
        }

        let on_screen = store.collider.aabb_max_x.get(i) >= 0.0
            && store.collider.aabb_min_x.get(i) <= canvas_width
            && store.collider.aabb_max_y.get(i) >= 0.0
            && store.collider.aabb_min_y.get(i) <= canvas_height;
        store.sprite.on_screen.set(i, u8::from(on_screen));

        let visible = store.sprite.alpha.get(i) > 0.0;
        store.sprite.render_visible.set(i, u8::from(visible));

        let moved = store.transform.x.get(i) != store.transform.prev_x.get(i)
            || store.transform.y.get(i) != store.transform.prev_y.get(i);
        store.sprite.render_dirty.set(i, u8::from(moved));
    }
}
