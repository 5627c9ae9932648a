//! Entity class registry and spawn pool.
//!
//! Classes are registered in order during engine construction; each receives
//! a contiguous `[start, start + count)` slice of rows and a sequential
//! `ClassId` that doubles as the `entity_type` tag.  Class 0 is always the
//! pointer probe (one row mirroring the mouse into the spatial world).
//!
//! Rows are never moved: despawning clears `active` and resets the row's
//! columns, spawning claims the lowest free row in the class range by CAS on
//! the `active` flag.  Concurrent spawns race safely — exactly one caller
//! wins each row.

use std::collections::HashMap;

use swarm_core::{ClassId, EntityId, Vec2};

use crate::error::{StoreError, StoreResult};
use crate::store::ComponentStore;

/// Initial state handed to `spawn` and forwarded to the class's `on_spawn`
/// hook.
#[derive(Clone, Debug, Default)]
pub struct SpawnConfig {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// One registered entity class.
pub struct ClassInfo {
    pub name: String,
    pub class_id: ClassId,
    /// Parent class in the inheritance chain, if any.
    pub parent: Option<ClassId>,
    /// First row of the class's slice.
    pub start: usize,
    /// Rows reserved for the class.  Parent classes auto-registered on
    /// behalf of a child have count 0.
    pub count: usize,
    /// Component/asset tags recorded for external loaders.  The store itself
    /// allocates every registered column for all rows regardless.
    pub components: Vec<&'static str>,
}

impl ClassInfo {
    /// The class's row range.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Ordered class table plus the spawn pool operations.
pub struct EntityRegistry {
    classes: Vec<ClassInfo>,
    by_name: HashMap<String, ClassId>,
    total: usize,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Create a registry with the reserved pointer class (id 0, one row).
    pub fn new() -> Self {
        let mut registry = Self { classes: Vec::new(), by_name: HashMap::new(), total: 0 };
        registry
            .register("pointer", 1)
            .expect("registering the reserved pointer class cannot fail");
        registry
    }

    // ── Registration (construction phase, single-threaded) ────────────────

    /// Append a class with `count` reserved rows.  Returns its `ClassId`.
    pub fn register(&mut self, name: &str, count: usize) -> StoreResult<ClassId> {
        self.register_with_parent(name, count, None)
    }

    /// Append a class that inherits `parent`'s component set.  The parent is
    /// auto-registered with count 0 if it has not been seen yet.
    pub fn register_child(
        &mut self,
        name: &str,
        count: usize,
        parent: &str,
    ) -> StoreResult<ClassId> {
        let parent_id = match self.by_name.get(parent) {
            Some(&id) => id,
            None => self.register(parent, 0)?,
        };
        self.register_with_parent(name, count, Some(parent_id))
    }

    fn register_with_parent(
        &mut self,
        name: &str,
        count: usize,
        parent: Option<ClassId>,
    ) -> StoreResult<ClassId> {
        if let Some(&existing) = self.by_name.get(name) {
            // Re-registering (e.g. a parent placeholder) keeps the original id.
            return Ok(existing);
        }
        let class_id = ClassId(self.classes.len() as u16);
        self.classes.push(ClassInfo {
            name: name.to_owned(),
            class_id,
            parent,
            start: self.total,
            count,
            components: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), class_id);
        self.total += count;
        Ok(class_id)
    }

    /// Record a component tag for `class` (walked by inheritance lookups).
    pub fn add_component_tag(&mut self, class: ClassId, tag: &'static str) {
        if let Some(info) = self.classes.get_mut(class.index()) {
            if !info.components.contains(&tag) {
                info.components.push(tag);
            }
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Total rows across all classes — the store capacity N.
    #[inline]
    pub fn total_entities(&self) -> usize {
        self.total
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id.index())
    }

    pub fn class_by_name(&self, name: &str) -> StoreResult<&ClassInfo> {
        let id = self
            .by_name
            .get(name)
            .ok_or_else(|| StoreError::UnknownClass(name.to_owned()))?;
        Ok(&self.classes[id.index()])
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Component tags of `class` plus every ancestor, leaf first.
    pub fn inherited_components(&self, class: ClassId) -> Vec<&'static str> {
        let mut tags = Vec::new();
        let mut cursor = Some(class);
        while let Some(id) = cursor {
            let Some(info) = self.classes.get(id.index()) else { break };
            for &tag in &info.components {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            cursor = info.parent;
        }
        tags
    }

    /// Stamp `entity_type` for every row.  Called once after the store is
    /// allocated; the tags are constant afterwards.
    pub fn assign_entity_types(&self, store: &ComponentStore) {
        for info in &self.classes {
            for row in info.range() {
                store.entity_type.set(row, info.class_id.0);
            }
        }
    }

    // ── Spawn pool ────────────────────────────────────────────────────────

    /// Claim the lowest free row in `class`'s range, mark it active, and
    /// initialize its transform from `config`.
    ///
    /// Thread-safe: the CAS on `active` decides the winner under concurrent
    /// spawns.  The caller is responsible for invoking the class's `on_spawn`
    /// hook with the returned row.
    pub fn spawn(
        &self,
        store: &ComponentStore,
        class: ClassId,
        config: &SpawnConfig,
    ) -> StoreResult<EntityId> {
        let info = self
            .classes
            .get(class.index())
            .ok_or_else(|| StoreError::UnknownClass(format!("{class}")))?;

        for row in info.range() {
            if store.transform.active.get(row) != 0 {
                continue;
            }
            if !store.transform.active.try_claim(row) {
                continue; // lost the race for this row; keep scanning
            }
            store.place(row, Vec2::new(config.x, config.y));
            // Seed the Verlet history so the first integrate step carries the
            // requested velocity.
            store.transform.prev_x.set(row, config.x - config.vx);
            store.transform.prev_y.set(row, config.y - config.vy);
            store.body.vx.set(row, config.vx);
            store.body.vy.set(row, config.vy);
            // Collidable and visible out of the box; on_spawn refines.
            store.collider.layer.set(row, 1);
            store.collider.mask.set(row, u16::MAX);
            store.sprite.tint.set(row, 0xFFFF_FFFF);
            store.sprite.alpha.set(row, 1.0);
            store.sprite.scale_x.set(row, 1.0);
            store.sprite.scale_y.set(row, 1.0);
            store.sprite.render_visible.set(row, 1);
            return Ok(EntityId(row as u32));
        }
        Err(StoreError::PoolExhausted { class: info.name.clone() })
    }

    /// Release `row` back to the pool and restore its columns to the zero
    /// image.  The caller invokes `on_despawn` *before* this.
    pub fn despawn(&self, store: &ComponentStore, entity: EntityId) -> StoreResult<()> {
        store.check_row(entity.index())?;
        store.transform.active.set(entity.index(), 0);
        store.reset_row(entity.index());
        Ok(())
    }

    /// Rows of `class` that are currently active.
    pub fn active_rows<'a>(
        &'a self,
        store: &'a ComponentStore,
        class: ClassId,
    ) -> impl Iterator<Item = EntityId> + 'a {
        let range = self.classes.get(class.index()).map(|c| c.range()).unwrap_or(0..0);
        range.filter(|&row| store.is_active(row)).map(|row| EntityId(row as u32))
    }
}
