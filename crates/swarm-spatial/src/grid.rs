//! The uniform hash grid.
//!
//! One flat `(cols · rows) × (1 + cap)` array of atomic slots; each cell's
//! stripe is `[count, id0, id1, …]`.  Insertion reserves a slot by fetch-add
//! on the count, so any number of workers can insert concurrently.  A side
//! list of occupied cell indices makes `clear` proportional to occupancy
//! rather than to the total cell count — with a sparse world most cells are
//! never touched.
//!
//! A full cell drops further entities from this frame's grid.  That is the
//! documented lossy behavior: the cap is sized so it only triggers when local
//! density exceeds three times the uniform average, and every drop is counted
//! for diagnostics.

use std::sync::atomic::{AtomicU32, Ordering};

/// Per-cell entity cap bounds.
const MIN_CELL_CAP: usize = 32;
const MAX_CELL_CAP: usize = 256;

/// Uniform 2D hash grid over the world rectangle.
pub struct UniformGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// Entities per cell before drops begin.
    cap: usize,
    /// `1 + cap` — width of one cell's stripe in `slots`.
    stride: usize,
    slots: Box<[AtomicU32]>,
    /// Indices of cells with a nonzero count, for occupancy-proportional clear.
    occupied: Box<[AtomicU32]>,
    occupied_len: AtomicU32,
    /// Entities dropped because their cell was full, since the last take.
    overflow: AtomicU32,
}

impl UniformGrid {
    /// Build a grid covering `world_width × world_height` with the given cell
    /// size, capacity-tuned for `entity_count` entities.
    pub fn new(world_width: u32, world_height: u32, cell_size: u32, entity_count: usize) -> Self {
        let cols = (world_width as usize).div_ceil(cell_size as usize).max(1);
        let rows = (world_height as usize).div_ceil(cell_size as usize).max(1);
        let cells = cols * rows;
        let cap = (3 * entity_count.div_ceil(cells)).clamp(MIN_CELL_CAP, MAX_CELL_CAP);
        let stride = 1 + cap;
        Self {
            cell_size: cell_size as f32,
            cols,
            rows,
            cap,
            stride,
            slots: (0..cells * stride).map(|_| AtomicU32::new(0)).collect(),
            occupied: (0..cells).map(|_| AtomicU32::new(0)).collect(),
            occupied_len: AtomicU32::new(0),
            overflow: AtomicU32::new(0),
        }
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Entities one cell can hold before dropping.
    #[inline(always)]
    pub fn cell_capacity(&self) -> usize {
        self.cap
    }

    /// The cell coordinates of a world position, or `None` when the position
    /// must be skipped (NaN/infinite or negative).  Positions beyond the far
    /// edges clamp to the boundary cells.
    #[inline]
    pub fn cell_coords(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = ((x / self.cell_size) as usize).min(self.cols - 1);
        let row = ((y / self.cell_size) as usize).min(self.rows - 1);
        Some((col, row))
    }

    #[inline(always)]
    fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Insert `entity` at `(x, y)`.  Returns `false` when the position was
    /// skipped or the cell was full.
    pub fn insert(&self, entity: u32, x: f32, y: f32) -> bool {
        let Some((col, row)) = self.cell_coords(x, y) else {
            return false;
        };
        let base = self.cell_index(col, row) * self.stride;
        let slot = self.slots[base].fetch_add(1, Ordering::Relaxed);
        if slot as usize >= self.cap {
            self.slots[base].fetch_sub(1, Ordering::Relaxed);
            self.overflow.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.slots[base + 1 + slot as usize].store(entity, Ordering::Relaxed);
        if slot == 0 {
            // First occupant registers the cell for the next clear.
            let at = self.occupied_len.fetch_add(1, Ordering::Relaxed);
            self.occupied[at as usize].store(self.cell_index(col, row) as u32, Ordering::Relaxed);
        }
        true
    }

    /// Entities currently in the cell at `(col, row)`.
    #[inline]
    pub fn cell_len(&self, col: usize, row: usize) -> usize {
        let base = self.cell_index(col, row) * self.stride;
        (self.slots[base].load(Ordering::Relaxed) as usize).min(self.cap)
    }

    /// The `slot`-th entity of the cell, in insertion order.
    #[inline]
    pub fn cell_entry(&self, col: usize, row: usize, slot: usize) -> u32 {
        let base = self.cell_index(col, row) * self.stride;
        self.slots[base + 1 + slot].load(Ordering::Relaxed)
    }

    /// Empty every occupied cell.  Orchestrator-only, between frames; cost is
    /// proportional to the number of occupied cells.
    pub fn clear(&self) {
        let n = self.occupied_len.swap(0, Ordering::Relaxed);
        for k in 0..n as usize {
            let cell = self.occupied[k].load(Ordering::Relaxed) as usize;
            self.slots[cell * self.stride].store(0, Ordering::Relaxed);
        }
    }

    /// Drain the overflow counter (drops since the previous call).
    pub fn take_overflow(&self) -> u32 {
        self.overflow.swap(0, Ordering::Relaxed)
    }

    /// Total occupants across all cells (diagnostic).
    pub fn occupancy(&self) -> usize {
        let n = self.occupied_len.load(Ordering::Relaxed);
        (0..n as usize)
            .map(|k| {
                let cell = self.occupied[k].load(Ordering::Relaxed) as usize;
                (self.slots[cell * self.stride].load(Ordering::Relaxed) as usize).min(self.cap)
            })
            .sum()
    }
}
