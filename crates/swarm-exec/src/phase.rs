//! The per-frame phase sequence.

/// One global step of the frame pipeline.  Phases run in declaration order;
/// `Constrain` repeats `sub_step_count` times.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Phase {
    /// Append active entities to the spatial grid.
    #[default]
    GridInsert = 0,
    /// Build neighbor lists and record overlap pairs.
    NeighborQuery = 1,
    /// User `tick` dispatch.
    Behavior = 2,
    /// Deliver enter/stay/exit collision events.
    Collision = 3,
    /// Verlet integrate.
    Integrate = 4,
    /// One constraint sub-step (boundary + pair relaxation).
    Constrain = 5,
    /// Derive velocity/rotation/AABB and refresh the render view columns.
    Publish = 6,
}

/// Number of distinct phases (for per-phase counters).
pub const PHASE_COUNT: usize = 7;

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] = [
        Phase::GridInsert,
        Phase::NeighborQuery,
        Phase::Behavior,
        Phase::Collision,
        Phase::Integrate,
        Phase::Constrain,
        Phase::Publish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::GridInsert => "grid_insert",
            Phase::NeighborQuery => "neighbor_query",
            Phase::Behavior => "behavior",
            Phase::Collision => "collision",
            Phase::Integrate => "integrate",
            Phase::Constrain => "constrain",
            Phase::Publish => "publish",
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}
