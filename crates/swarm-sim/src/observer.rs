//! Frame observer trait for progress reporting and host integration.

use crate::diag::FrameStats;
use crate::view::RenderView;

/// Callbacks invoked by [`Engine::run`][crate::Engine::run] at frame
/// boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — FPS printer
///
/// ```rust,ignore
/// struct FpsPrinter;
///
/// impl FrameObserver for FpsPrinter {
///     fn on_frame_end(&mut self, frame: u64, stats: &FrameStats) {
///         if frame % 60 == 0 {
///             println!("frame {frame}: {:.1} fps, {} active", stats.fps, stats.active);
///         }
///     }
/// }
/// ```
pub trait FrameObserver {
    /// Called before any phase of the frame runs.
    fn on_frame_start(&mut self, _frame: u64) {}

    /// Called after the publish phase with the read-only renderer view.
    ///
    /// This is the hand-off point for external renderers: every render-view
    /// column is stable until the next frame begins.
    fn on_publish(&mut self, _frame: u64, _view: &RenderView<'_>) {}

    /// Called after the frame completes, with timings.
    fn on_frame_end(&mut self, _frame: u64, _stats: &FrameStats) {}

    /// Called once when the run loop exits.
    fn on_sim_end(&mut self, _final_frame: u64) {}
}

/// A [`FrameObserver`] that does nothing.
pub struct NoopObserver;

impl FrameObserver for NoopObserver {}
