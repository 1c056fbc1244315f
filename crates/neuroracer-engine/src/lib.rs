//! Deterministic 2D driving simulation for neuroevolution training.
//!
//! This crate implements the simulation side of the workspace: track geometry
//! with ray-cast queries, a distance sensor array, simple vehicle kinematics,
//! and a bounded episode runner that turns one controller's drive into a
//! fitness signal.
//!
//! # Architecture
//!
//! ```text
//! EpisodeRunner (tick loop, terminal states, fitness)
//!     ↓ reads
//! SensorArray (ray fan → normalized distances)
//!     ↓ queries
//! Track (boundary loops, containment, centerline progress)
//! ```
//!
//! Controllers plug in through the [`Controller`] trait; the episode runner
//! never knows whether decisions come from an evolved network, a scripted
//! closure, or a manual front end.
//!
//! Everything here is deterministic: the same controller on the same track
//! with the same configuration produces an identical [`EpisodeSummary`] every
//! run. There is no hidden randomness and no shared mutable state, which is
//! what allows generations of episodes to be evaluated in parallel.

pub use self::{
    config::*, controller::*, episode::*, geometry::*, kinematics::*, sensor::*, track::*,
};

pub mod config;
pub mod controller;
pub mod episode;
pub mod geometry;
pub mod kinematics;
pub mod sensor;
pub mod track;
