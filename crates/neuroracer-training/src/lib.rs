//! Training system: population evaluation and the generation loop.
//!
//! This crate connects the simulation engine to the evolution capability:
//!
//! ```text
//! Trainer (generations, reports, stopping criteria, checkpoints)
//!     ↓ drives
//! PopulationEvaluator (one episode per genome, in parallel)
//!     ↓ runs
//! EpisodeRunner (neuroracer-engine)
//!     ↑ controllers compiled via
//! Evolution capability (neuroracer-evolve)
//! ```
//!
//! Episodes within a generation are independent and side-effect-free, so the
//! evaluator runs them on scoped threads over a shared immutable track with
//! no locking. A generation is scored atomically: cancellation discards the
//! partial generation rather than recording part of it.
//!
//! The best genome found so far is checkpointed after every generation, so
//! an interrupted run can be resumed into a driveable controller without
//! re-running evolution.

pub use self::{checkpoint::*, evaluator::*, stats::*, trainer::*};

pub mod checkpoint;
pub mod evaluator;
pub mod stats;
pub mod trainer;
