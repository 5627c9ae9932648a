//! Per-frame input view.
//!
//! The orchestrator rewrites [`InputState`] exactly once per frame, before
//! any phase runs; workers read it freely during the frame and always observe
//! one stable snapshot.  Atomics (relaxed) are used so the shared struct can
//! be read through `&` from every worker without locks — the phase barrier
//! provides the actual ordering.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Number of mapped keyboard keys tracked in the flat key array.
pub const MAX_KEYS: usize = 128;

/// Mouse buttons tracked (left, middle, right).
pub const MOUSE_BUTTONS: usize = 3;

// ── Snapshot (plain data) ─────────────────────────────────────────────────────

/// One frame's input, as plain copyable data.
///
/// Produced by the host (window/event layer), handed to the engine, and read
/// back by behaviors via the tick context.
#[derive(Clone, Debug)]
pub struct InputSnapshot {
    /// Mouse position in world coordinates.
    pub mouse_x: f32,
    pub mouse_y: f32,
    /// `false` when the pointer left the window.
    pub mouse_present: bool,
    /// Button states, indexed 0 = left, 1 = middle, 2 = right.
    pub buttons: [bool; MOUSE_BUTTONS],
    /// 0/1 per mapped key.
    pub keys: [u8; MAX_KEYS],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            mouse_x: 0.0,
            mouse_y: 0.0,
            mouse_present: false,
            buttons: [false; MOUSE_BUTTONS],
            keys: [0; MAX_KEYS],
        }
    }
}

// ── Shared state (atomic cells) ───────────────────────────────────────────────

/// The shared input record workers read during a frame.
///
/// Written only by the orchestrator between frames; the write is therefore
/// ordered before every worker read by the phase gate.
pub struct InputState {
    mouse_x_bits: AtomicU32,
    mouse_y_bits: AtomicU32,
    mouse_present: AtomicU8,
    buttons: [AtomicU8; MOUSE_BUTTONS],
    keys: [AtomicU8; MAX_KEYS],
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            mouse_x_bits: AtomicU32::new(0),
            mouse_y_bits: AtomicU32::new(0),
            mouse_present: AtomicU8::new(0),
            buttons: std::array::from_fn(|_| AtomicU8::new(0)),
            keys: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Publish `snapshot` as the current frame's input.
    pub fn publish(&self, snapshot: &InputSnapshot) {
        self.mouse_x_bits.store(snapshot.mouse_x.to_bits(), Ordering::Relaxed);
        self.mouse_y_bits.store(snapshot.mouse_y.to_bits(), Ordering::Relaxed);
        self.mouse_present
            .store(snapshot.mouse_present as u8, Ordering::Relaxed);
        for (cell, &b) in self.buttons.iter().zip(snapshot.buttons.iter()) {
            cell.store(b as u8, Ordering::Relaxed);
        }
        for (cell, &k) in self.keys.iter().zip(snapshot.keys.iter()) {
            cell.store(k, Ordering::Relaxed);
        }
    }

    /// Read the current frame's input back as plain data.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            mouse_x: f32::from_bits(self.mouse_x_bits.load(Ordering::Relaxed)),
            mouse_y: f32::from_bits(self.mouse_y_bits.load(Ordering::Relaxed)),
            mouse_present: self.mouse_present.load(Ordering::Relaxed) != 0,
            buttons: std::array::from_fn(|i| self.buttons[i].load(Ordering::Relaxed) != 0),
            keys: std::array::from_fn(|i| self.keys[i].load(Ordering::Relaxed)),
        }
    }
}
