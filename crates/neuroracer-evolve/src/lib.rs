//! The evolutionary-algorithm capability behind the training loop.
//!
//! The training crate drives evolution through exactly two operations: ask
//! for the next population, and project a genome into something that can
//! drive ([`Evolution::next_population`] and [`Evolution::network`]). It
//! never inspects or mutates genome internals, so this whole crate is
//! swappable: a NEAT-style implementation with topology mutation would slot
//! in behind the same trait.
//!
//! The shipped implementation, [`GaEvolution`], evolves flat weight vectors
//! for a fixed-topology feedforward network using tournament selection,
//! BLX-α crossover, Gaussian mutation, and elitism.
//!
//! # How a genome drives
//!
//! ```text
//! Genome (flat weights)
//!     ↓ Evolution::network
//! FeedForwardNetwork (compiled, tanh MLP)
//!     ↓ wrapped by
//! NetworkController (Controller impl)
//!     ↓ decides for
//! EpisodeRunner (neuroracer-engine)
//! ```

use neuroracer_engine::EpisodeSummary;
use serde::{Deserialize, Serialize};

pub use self::{genetic::*, network::*};

pub mod genetic;
pub mod network;
pub mod weights;

/// Opaque genome identifier, unique within a population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct GenomeId(u64);

impl GenomeId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// One candidate controller: an id plus the flat parameter vector its
/// network is compiled from.
///
/// Outside this crate a genome is opaque: the training loop only ever passes
/// it back to [`Evolution::network`] or reads its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    id: GenomeId,
    weights: Vec<f32>,
}

impl Genome {
    #[must_use]
    pub const fn new(id: GenomeId, weights: Vec<f32>) -> Self {
        Self { id, weights }
    }

    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.id
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Scored outcome for one genome in one generation.
///
/// Written once by the population evaluator, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessRecord {
    pub genome: GenomeId,
    /// Higher is better; never below the configured fitness floor.
    pub fitness: f32,
    pub summary: EpisodeSummary,
}

#[derive(Debug, derive_more::Display, derive_more::Error, PartialEq, Eq)]
pub enum EvolutionError {
    #[display("genome has {actual} weights, network shape needs {expected}")]
    WeightCountMismatch { expected: usize, actual: usize },
    #[display("fitness feedback references unknown genome {id}")]
    UnknownGenome { id: GenomeId },
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("elite count {elite_count} must be below population size {population_size}")]
    EliteCountTooLarge {
        elite_count: usize,
        population_size: usize,
    },
    #[display("tournament size must be at least 1")]
    ZeroTournament,
    #[display("genetic operator parameters must be finite and non-negative")]
    InvalidOperatorParameter,
}

/// The narrow contract the training loop consumes.
///
/// `next_population` takes the previous generation's fitness feedback (empty
/// on the first call) and returns the genomes to evaluate next; `network`
/// compiles one genome into an evaluable network. Errors here are
/// generation-level and fatal to a run, unlike per-episode faults which the
/// engine recovers locally.
pub trait Evolution {
    fn next_population(&mut self, feedback: &[FitnessRecord]) -> Result<Vec<Genome>, EvolutionError>;

    fn network(&self, genome: &Genome) -> Result<FeedForwardNetwork, EvolutionError>;
}
