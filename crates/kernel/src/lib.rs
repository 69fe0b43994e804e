//! Frame loop: the per-frame step, its explicit context, and a cancellable
//! driver for hosts without their own event loop.
//!
//! # Invariants
//! - All mutable demo state lives in [`FrameContext`]; there are no globals.
//! - Input written between frames is applied by the next step, last write wins.
//! - The camera projection is recomputed only on the frame a resize happens.

mod context;
mod schedule;

pub use context::{FrameContext, FrameError, FrameReport};
pub use schedule::{CancellationToken, FixedRateScheduler, FrameScheduler, RunSummary, run};
