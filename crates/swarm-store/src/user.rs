//! Type-erased registry for application-defined component columns.
//!
//! # Design
//!
//! Each user component type `T` is one [`Column<T>`] behind a
//! `Box<dyn UserColumn>` in a `HashMap<TypeId, …>`.  Columns are always
//! exactly `count` rows long — the same dense "row = entity" contract as the
//! built-in groups, so behavior code indexes user state with the same row it
//! uses everywhere else.
//!
//! Registration happens during engine construction only.  `freeze()` is
//! called before the first frame; any later `register` fails, which keeps the
//! arena allocation-free in steady state.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::column::Column;
use crate::error::{StoreError, StoreResult};

// ── Trait object ──────────────────────────────────────────────────────────────

/// Type-erased interface over a user [`Column<T>`].
///
/// Sealed so external impls cannot break the fixed-length invariant.
pub trait UserColumn: Send + Sync + 'static + sealed::Sealed {
    /// Restore one row to `T::default()` (despawn path).
    fn reset_row(&self, row: usize);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
}

mod sealed {
    pub trait Sealed {}
}

/// A [`Column<T>`] wrapped for storage as `Box<dyn UserColumn>`.
pub struct TypedUserColumn<T: Copy + Default + Send + 'static>(pub Column<T>);

impl<T: Copy + Default + Send + 'static> sealed::Sealed for TypedUserColumn<T> {}

impl<T: Copy + Default + Send + Sync + 'static> UserColumn for TypedUserColumn<T> {
    fn reset_row(&self, row: usize) {
        self.0.set(row, T::default());
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── UserComponents ────────────────────────────────────────────────────────────

/// Registry of user component columns, one `Column<T>` per type.
#[derive(Default)]
pub struct UserComponents {
    map: HashMap<TypeId, Box<dyn UserColumn>>,
    frozen: bool,
}

impl UserComponents {
    pub fn new() -> Self {
        Self { map: HashMap::new(), frozen: false }
    }

    /// Register component type `T`, allocating `count` default cells.
    ///
    /// Registering the same `T` twice is a no-op.  Fails once the set has
    /// been frozen (the first frame has started).
    pub fn register<T: Copy + Default + Send + Sync + 'static>(
        &mut self,
        count: usize,
    ) -> StoreResult<()> {
        if self.frozen {
            return Err(StoreError::Frozen(std::any::type_name::<T>()));
        }
        self.map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedUserColumn::<T>(Column::new(count))));
        Ok(())
    }

    /// Freeze the set.  Called by the engine builder before the first frame.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The column for component `T`.
    ///
    /// Cell access follows the same row-ownership discipline as the built-in
    /// columns: a behavior may write its own entity's cell and read anyone's.
    pub fn column<T: Copy + Default + Send + Sync + 'static>(&self) -> StoreResult<&Column<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<TypedUserColumn<T>>())
            .map(|c| &c.0)
            .ok_or_else(|| StoreError::UnknownComponent(std::any::type_name::<T>()))
    }

    /// `true` if component `T` has been registered.
    pub fn contains<T: Copy + Default + Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of distinct registered component types.
    pub fn type_count(&self) -> usize {
        self.map.len()
    }

    /// Restore one row of every registered column to its default.
    pub fn reset_row(&self, row: usize) {
        for col in self.map.values() {
            col.reset_row(row);
        }
    }
}
