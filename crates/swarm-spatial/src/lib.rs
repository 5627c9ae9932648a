//! `swarm-spatial` — uniform hash grid and neighbor-list builder.
//!
//! # Per-frame protocol
//!
//! 1. The orchestrator calls [`UniformGrid::clear`] (cost proportional to
//!    occupancy, not to the number of cells).
//! 2. Workers run [`insert_range`] over their claimed row ranges: every
//!    active entity with a usable position is appended to its cell.
//! 3. After the insert barrier, workers run [`query_range`]: each row's
//!    neighbor stripe is rebuilt (at most K entries, ascending index order)
//!    and overlapping pairs are appended to the store's pair buffer.
//!
//! The grid is deliberately lossy under extreme local density: a full cell
//! drops entities from that frame and counts the drop.  See
//! [`UniformGrid::take_overflow`].

pub mod grid;
pub mod query;

#[cfg(test)]
mod tests;

pub use grid::UniformGrid;
pub use query::{insert_range, query_range};
