//! The evolution orchestrator: generations, reports, stopping criteria.
//!
//! Each generation: request the next population from the evolution
//! capability, evaluate it, feed the fitness back, record a
//! [`GenerationReport`], persist the best genome so far, then check the stop
//! conditions (target fitness, generation cap, cancellation).
//!
//! The checkpoint is written after *every* generation, not just at the end,
//! so interrupting a run loses at most the generation in flight. A failure
//! in the evolution capability is fatal and aborts the run; the last written
//! checkpoint stays on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use neuroracer_engine::{ConfigError, SimConfig, Track};
use neuroracer_evolve::{
    Evolution, EvolutionError, FitnessRecord, GaEvolution, GaParams, Genome, GenomeId, NetworkShape,
};

use crate::{
    checkpoint::{Checkpoint, CheckpointError},
    evaluator::{CancelToken, EvaluationError, PopulationEvaluator},
    stats::FitnessStats,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("invalid simulation configuration: {_0}")]
    Config(ConfigError),
    #[display("generation cap must be at least 1")]
    ZeroGenerationCap,
    #[display("hidden neuron count must be at least 1")]
    ZeroHiddenNeurons,
    #[display("target fitness must be finite")]
    NonFiniteTargetFitness,
    #[display("evolution capability failed: {_0}")]
    Evolution(EvolutionError),
    #[display("evaluation failed: {_0}")]
    Evaluation(EvaluationError),
    #[display("checkpoint failed: {_0}")]
    Checkpoint(CheckpointError),
    #[display("run was cancelled before any generation completed")]
    NoCompletedGenerations,
}

impl From<ConfigError> for TrainingError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<EvolutionError> for TrainingError {
    fn from(err: EvolutionError) -> Self {
        Self::Evolution(err)
    }
}

impl From<EvaluationError> for TrainingError {
    fn from(err: EvaluationError) -> Self {
        Self::Evaluation(err)
    }
}

impl From<CheckpointError> for TrainingError {
    fn from(err: CheckpointError) -> Self {
        Self::Checkpoint(err)
    }
}

/// Everything a training run needs beyond the track itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub sim: SimConfig,
    /// Hard bound on generations.
    pub generation_cap: usize,
    /// Stop early once a generation's best fitness reaches this.
    pub target_fitness: Option<f32>,
    /// Hidden layer width of the evolved networks.
    pub hidden_neurons: usize,
    /// Seed for the evolution RNG; same seed, same run.
    pub seed: u64,
    pub ga: GaParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            generation_cap: 200,
            target_fitness: None,
            hidden_neurons: 8,
            seed: 0,
            ga: GaParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), TrainingError> {
        self.sim.validate()?;
        self.ga.validate()?;
        if self.generation_cap == 0 {
            return Err(TrainingError::ZeroGenerationCap);
        }
        if self.hidden_neurons == 0 {
            return Err(TrainingError::ZeroHiddenNeurons);
        }
        if self.target_fitness.is_some_and(|t| !t.is_finite()) {
            return Err(TrainingError::NonFiniteTargetFitness);
        }
        Ok(())
    }

    /// Network shape implied by the sensor fan and hidden width.
    #[must_use]
    pub fn network_shape(&self) -> NetworkShape {
        NetworkShape::driving(self.sim.ray_count, self.hidden_neurons)
    }
}

/// One generation's outcome in the training history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub fitness: FitnessStats,
    pub best_genome: GenomeId,
}

/// The best genome a run has produced, with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct BestGenome {
    pub genome: Genome,
    pub fitness: f32,
    pub generation: usize,
}

/// What a completed (or cancelled-after-progress) run returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub best: BestGenome,
    pub history: Vec<GenerationReport>,
}

/// Drives generations of evaluate-and-evolve over one track.
#[derive(Debug)]
pub struct Trainer<'a> {
    track: &'a Track,
    config: &'a TrainingConfig,
    checkpoint_path: Option<PathBuf>,
    checkpoint_name: String,
}

impl<'a> Trainer<'a> {
    /// Validates the configuration and prepares a run. Fails fast: no
    /// episode runs against an invalid configuration.
    pub fn new(track: &'a Track, config: &'a TrainingConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        Ok(Self {
            track,
            config,
            checkpoint_path: None,
            checkpoint_name: "best-genome".to_owned(),
        })
    }

    /// Writes the best-so-far checkpoint to `path` after every generation.
    #[must_use]
    pub fn with_checkpoint<P>(mut self, path: P, name: &str) -> Self
    where
        P: AsRef<Path>,
    {
        self.checkpoint_path = Some(path.as_ref().to_owned());
        self.checkpoint_name = name.to_owned();
        self
    }

    /// Runs generations until a stop condition holds.
    ///
    /// `observer` sees every completed generation's report; it is for
    /// progress output and never affects the loop.
    pub fn run<E, F>(
        &self,
        evolution: &mut E,
        cancel: &CancelToken,
        mut observer: F,
    ) -> Result<TrainingOutcome, TrainingError>
    where
        E: Evolution,
        F: FnMut(&GenerationReport),
    {
        let evaluator = PopulationEvaluator::new(self.track, &self.config.sim);
        let mut history = Vec::new();
        let mut best: Option<BestGenome> = None;
        let mut feedback: Vec<FitnessRecord> = Vec::new();

        for generation in 0..self.config.generation_cap {
            if cancel.is_cancelled() {
                break;
            }
            let population = evolution.next_population(&feedback)?;
            let records = match evaluator.evaluate(&population, evolution, cancel) {
                Ok(records) => records,
                // A cancelled generation is discarded, not partially scored.
                Err(EvaluationError::Cancelled) => break,
                Err(err) => return Err(err.into()),
            };

            let round_best = records
                .iter()
                .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
                .unwrap();
            if best
                .as_ref()
                .is_none_or(|current| round_best.fitness > current.fitness)
            {
                let genome = population
                    .iter()
                    .find(|genome| genome.id() == round_best.genome)
                    .unwrap()
                    .clone();
                best = Some(BestGenome {
                    genome,
                    fitness: round_best.fitness,
                    generation,
                });
            }

            if let Some(path) = &self.checkpoint_path {
                let current = best.as_ref().unwrap();
                Checkpoint::from_best(current, self.config.network_shape(), &self.checkpoint_name)
                    .save(path)?;
            }

            let report = GenerationReport {
                generation,
                fitness: FitnessStats::new(records.iter().map(|r| r.fitness)).unwrap(),
                best_genome: round_best.genome,
            };
            observer(&report);

            let target_reached = self
                .config
                .target_fitness
                .is_some_and(|target| report.fitness.max >= target);
            history.push(report);
            if target_reached {
                break;
            }
            feedback = records;
        }

        let best = best.ok_or(TrainingError::NoCompletedGenerations)?;
        Ok(TrainingOutcome { best, history })
    }
}

/// Single entry point for front ends: train with the default GA capability.
///
/// Writes per-generation checkpoints when `checkpoint_path` is given.
pub fn run_training(
    track: &Track,
    config: &TrainingConfig,
    checkpoint_path: Option<&Path>,
) -> Result<TrainingOutcome, TrainingError> {
    let mut trainer = Trainer::new(track, config)?;
    if let Some(path) = checkpoint_path {
        trainer = trainer.with_checkpoint(path, "best-genome");
    }
    let mut evolution = GaEvolution::new(config.network_shape(), config.ga, config.seed)?;
    trainer.run(&mut evolution, &CancelToken::new(), |_| {})
}
