//! Column primitives — the fixed-capacity, shareable arrays every component
//! field is stored in.
//!
//! # Sharing discipline
//!
//! Columns are allocated once at engine construction and never resized.  They
//! are read and written through `&` from many worker threads at once, under
//! two rules the rest of the workspace upholds:
//!
//! 1. **Row ownership** — within one phase, plain (non-atomic) cells of a row
//!    are written only by the job that owns that row.
//! 2. **Phase barrier** — writes from phase `p` are made visible to phase
//!    `p+1` by the release/acquire edges of the scheduler's done-gate.
//!
//! Fields that legitimately receive cross-row writes (positions during pair
//! constraint resolution, collision counters, the `active` flag) use the
//! atomic column flavors below, so those accesses are well-defined without
//! any ordering cost on x86.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

// ── Column<T> ─────────────────────────────────────────────────────────────────

/// A fixed-length column of plain `Copy` cells.
///
/// `get`/`set` take `&self`; soundness rests on the row-ownership discipline
/// above.  Out-of-range rows panic (the slice index), matching the "row < N"
/// contract enforced at the store's API boundary.
pub struct Column<T: Copy> {
    cells: Box<[UnsafeCell<T>]>,
}

impl<T: Copy> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("len", &self.cells.len()).finish()
    }
}

// SAFETY: cells are only accessed under the row-ownership + phase-barrier
// discipline documented on the module; two threads never touch the same cell
// inside one phase, and the scheduler's gates order cross-phase access.
unsafe impl<T: Copy + Send> Sync for Column<T> {}

impl<T: Copy + Default> Column<T> {
    pub fn new(len: usize) -> Self {
        Self { cells: (0..len).map(|_| UnsafeCell::new(T::default())).collect() }
    }
}

impl<T: Copy> Column<T> {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize) -> T {
        // SAFETY: see module docs; the owning job holds exclusive write access.
        unsafe { *self.cells[row].get() }
    }

    #[inline(always)]
    pub fn set(&self, row: usize, value: T) {
        // SAFETY: see module docs.
        unsafe { *self.cells[row].get() = value }
    }

    /// Overwrite every cell.  Init/reset paths only (single-threaded).
    pub fn fill(&self, value: T) {
        for row in 0..self.cells.len() {
            self.set(row, value);
        }
    }

    /// Copy the whole column out.  Test and snapshot helper.
    pub fn snapshot(&self) -> Vec<T> {
        (0..self.cells.len()).map(|row| self.get(row)).collect()
    }
}

// ── AtomicF32Column ───────────────────────────────────────────────────────────

/// An `f32` column stored as `AtomicU32` bit patterns.
///
/// Used for the fields that receive cross-row writes (an entity's position is
/// nudged by *both* endpoints' jobs during pair resolution).  `add` is a CAS
/// loop so concurrent corrections accumulate instead of clobbering.
pub struct AtomicF32Column {
    bits: Box<[AtomicU32]>,
}

impl AtomicF32Column {
    pub fn new(len: usize) -> Self {
        Self { bits: (0..len).map(|_| AtomicU32::new(0)).collect() }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize) -> f32 {
        f32::from_bits(self.bits[row].load(Ordering::Relaxed))
    }

    #[inline(always)]
    pub fn set(&self, row: usize, value: f32) {
        self.bits[row].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Atomically add `delta` to the cell.
    #[inline]
    pub fn add(&self, row: usize, delta: f32) {
        let cell = &self.bits[row];
        let mut cur = cell.load(Ordering::Relaxed);
        loop {
            let next = (f32::from_bits(cur) + delta).to_bits();
            match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(observed) => cur = observed,
            }
        }
    }

    pub fn fill(&self, value: f32) {
        for cell in self.bits.iter() {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Vec<f32> {
        self.bits.iter().map(|c| f32::from_bits(c.load(Ordering::Relaxed))).collect()
    }
}

// ── AtomicU32Column ───────────────────────────────────────────────────────────

/// A `u32` counter column (collision counts).  Incremented from both
/// endpoints' jobs, hence atomic.
pub struct AtomicU32Column {
    cells: Box<[AtomicU32]>,
}

impl AtomicU32Column {
    pub fn new(len: usize) -> Self {
        Self { cells: (0..len).map(|_| AtomicU32::new(0)).collect() }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize) -> u32 {
        self.cells[row].load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn set(&self, row: usize, value: u32) {
        self.cells[row].store(value, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn incr(&self, row: usize) {
        self.cells[row].fetch_add(1, Ordering::Relaxed);
    }

    pub fn fill(&self, value: u32) {
        for cell in self.cells.iter() {
            cell.store(value, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

// ── FlagColumn ────────────────────────────────────────────────────────────────

/// A `u8` flag column with a compare-exchange claim operation.
///
/// The `active` flag lives here: `try_claim` is the spawn pool's atomic
/// 0 → 1 transition, so two threads spawning into the same class race safely
/// and exactly one wins each row.
pub struct FlagColumn {
    cells: Box<[AtomicU8]>,
}

impl FlagColumn {
    pub fn new(len: usize) -> Self {
        Self { cells: (0..len).map(|_| AtomicU8::new(0)).collect() }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize) -> u8 {
        self.cells[row].load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn set(&self, row: usize, value: u8) {
        self.cells[row].store(value, Ordering::Relaxed);
    }

    /// Atomically flip the cell from 0 to 1.  Returns `true` for the winner.
    #[inline]
    pub fn try_claim(&self, row: usize) -> bool {
        self.cells[row]
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Number of rows currently set in `range`.
    pub fn count_set(&self, range: std::ops::Range<usize>) -> usize {
        range.filter(|&row| self.get(row) != 0).count()
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}
