//! Engine construction.
//!
//! All registration happens here, before the first frame: classes (each with
//! its behavior), user components, and configuration.  `build` validates the
//! config, sizes the arena, freezes the component set, and spawns the worker
//! pool — after it returns, steady state allocates nothing.

use std::sync::Arc;

use swarm_behavior::{Behavior, BehaviorHost, NoopBehavior};
use swarm_core::{ClassId, WorldConfig};
use swarm_exec::{PhaseRunner, WorkerPool};
use swarm_physics::PhysicsParams;
use swarm_spatial::UniformGrid;
use swarm_store::{ComponentStore, EntityRegistry, StoreResult, UserComponents};

use crate::engine::Engine;
use crate::error::SimResult;
use crate::world::WorldState;

type UserRegistration = Box<dyn FnOnce(&mut UserComponents, usize) -> StoreResult<()>>;

/// Builder for [`Engine`].
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = EngineBuilder::new(config);
/// let boid = builder.register_class("boid", 10_000, Box::new(FlockBehavior))?;
/// builder.register_component::<FlockState>();
/// let mut engine = builder.build()?;
/// engine.run(&mut NoopObserver);
/// ```
pub struct EngineBuilder {
    config: WorldConfig,
    registry: EntityRegistry,
    behaviors: Vec<(ClassId, Box<dyn Behavior>)>,
    user_registrations: Vec<UserRegistration>,
}

impl EngineBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            registry: EntityRegistry::new(),
            behaviors: Vec::new(),
            user_registrations: Vec::new(),
        }
    }

    /// Register an entity class with `count` pooled rows and its behavior.
    pub fn register_class(
        &mut self,
        name: &str,
        count: usize,
        behavior: Box<dyn Behavior>,
    ) -> SimResult<ClassId> {
        let id = self.registry.register(name, count)?;
        self.behaviors.push((id, behavior));
        Ok(id)
    }

    /// Register a class inheriting `parent`'s component tags.  The parent is
    /// auto-registered (with zero rows) if it hasn't been seen.
    pub fn register_class_with_parent(
        &mut self,
        name: &str,
        count: usize,
        parent: &str,
        behavior: Box<dyn Behavior>,
    ) -> SimResult<ClassId> {
        let id = self.registry.register_child(name, count, parent)?;
        self.behaviors.push((id, behavior));
        Ok(id)
    }

    /// Record a component/asset tag on `class` for external loaders.
    pub fn tag_component(&mut self, class: ClassId, tag: &'static str) {
        self.registry.add_component_tag(class, tag);
    }

    /// Register a user component column of `T`, one cell per entity row.
    pub fn register_component<T: Copy + Default + Send + Sync + 'static>(&mut self) {
        self.user_registrations
            .push(Box::new(|user, count| user.register::<T>(count)));
    }

    /// Validate, allocate the arena, spawn workers, and hand back the engine.
    pub fn build(self) -> SimResult<Engine> {
        self.config.validate()?;

        let registry = self.registry;
        let entity_count = registry.total_entities();
        if u32::try_from(entity_count).is_err() {
            return Err(swarm_core::CoreError::Invariant(format!(
                "entity count {entity_count} exceeds the u32 row index space"
            ))
            .into());
        }

        let mut store = ComponentStore::new(
            entity_count,
            self.config.spatial.max_neighbors,
            self.config.physics.max_collision_pairs,
        );
        for registration in self.user_registrations {
            registration(store.user_mut(), entity_count)?;
        }
        store.user_mut().freeze();
        registry.assign_entity_types(&store);

        // The pointer probe is driven by the input snapshot, not physics.
        store.body.is_static.set(0, 1);

        let grid = UniformGrid::new(
            self.config.world_width,
            self.config.world_height,
            self.config.spatial.cell_size,
            entity_count,
        );

        let mut host = BehaviorHost::new(registry.class_count(), entity_count, self.config.seed);
        host.set_behavior(ClassId::POINTER, Box::new(NoopBehavior));
        for (class, behavior) in self.behaviors {
            host.set_behavior(class, behavior);
        }

        let physics = PhysicsParams::new(&self.config.physics);
        let logic = self.config.logic.clone();

        tracing::info!(
            entities = entity_count,
            classes = registry.class_count(),
            workers = logic.workers,
            arena_bytes = store.buffer_bytes(),
            "building engine"
        );

        let world = Arc::new(WorldState::new(
            self.config,
            store,
            registry,
            grid,
            physics,
            host,
        ));
        let runner: Arc<dyn PhaseRunner> = Arc::clone(&world) as Arc<dyn PhaseRunner>;
        let pool = WorkerPool::spawn(runner, entity_count, &logic)?;

        Ok(Engine::new(world, pool))
    }
}
