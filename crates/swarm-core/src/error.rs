//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `CoreError` via `From` impls, or keep them separate and wrap `CoreError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.

use thiserror::Error;

/// The top-level error type for `swarm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration value outside its documented range.  Fatal during init.
    #[error("configuration error: {0}")]
    Config(String),

    /// An impossible state was observed (capacity mismatch, poisoned sync
    /// primitive).  Fatal: the engine tears down rather than continuing.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `swarm-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
