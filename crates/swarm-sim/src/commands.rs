//! Control commands and the cloneable handle hosts drive the engine with.
//!
//! Commands ride a low-rate channel, never shared memory: the hot path
//! exchanges data only through columns and barriers.  Everything here is
//! observed at a frame or phase boundary — there is no mid-phase preemption.

use crossbeam_channel::Sender;

use swarm_core::{InputSnapshot, PhysicsConfig};
use swarm_store::SpawnConfig;

/// A control message for the engine.
#[derive(Clone, Debug)]
pub enum Command {
    /// Claim a row of `class` and run its `on_spawn`.  Failure is surfaced
    /// on the diagnostic channel, not returned.
    Spawn { class: String, config: SpawnConfig },
    /// Despawn every active row of `class`.
    DespawnAll { class: String },
    /// Halt phase execution at the next boundary.
    Pause,
    /// Resume a paused engine.
    Resume,
    /// Finish the current phase, tear down workers, and exit the run loop.
    Quit,
    /// Replace the physics parameters (applied at the next integrate step).
    UpdatePhysics(PhysicsConfig),
    /// Replace the input snapshot published at the next frame start.
    SetInput(Box<InputSnapshot>),
    /// Host visibility: while `false` the main thread claims no jobs and is
    /// excluded from the barrier count.
    SetMainThreadActive(bool),
}

/// Cloneable sender half of the command channel.
///
/// All methods are fire-and-forget: if the engine is gone the command is
/// silently dropped, matching the "no return value" command contract.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Sender<Command>,
}

impl ControlHandle {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    fn send(&self, command: Command) {
        let _ = self.tx.send(command);
    }

    pub fn spawn(&self, class: &str, config: SpawnConfig) {
        self.send(Command::Spawn { class: class.to_owned(), config });
    }

    pub fn despawn_all(&self, class: &str) {
        self.send(Command::DespawnAll { class: class.to_owned() });
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn quit(&self) {
        self.send(Command::Quit);
    }

    pub fn update_physics(&self, config: PhysicsConfig) {
        self.send(Command::UpdatePhysics(config));
    }

    pub fn set_input(&self, snapshot: InputSnapshot) {
        self.send(Command::SetInput(Box::new(snapshot)));
    }

    pub fn set_main_thread_active(&self, active: bool) {
        self.send(Command::SetMainThreadActive(active));
    }
}
