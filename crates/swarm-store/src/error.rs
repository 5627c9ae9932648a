//! Store error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A component type was requested that was never registered.
    #[error("unknown component type {0}")]
    UnknownComponent(&'static str),

    /// A row index at or beyond the store's capacity.
    #[error("row {row} out of range (store capacity {count})")]
    IndexOutOfRange { row: usize, count: usize },

    /// `spawn` found no free row in the class's range.  Recoverable: the
    /// caller may retry after rows are despawned.
    #[error("spawn pool exhausted for class '{class}'")]
    PoolExhausted { class: String },

    /// Registration attempted after the component set was frozen.
    #[error("component set is frozen; cannot register {0} after startup")]
    Frozen(&'static str),

    /// An unknown class name was referenced.
    #[error("unknown entity class '{0}'")]
    UnknownClass(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
