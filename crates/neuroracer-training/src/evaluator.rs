//! Parallel fitness evaluation of one generation.
//!
//! Every genome's episode is independent: the track is shared read-only, and
//! each worker owns its controller, pose, and sensor buffers outright, so the
//! generation fans out over scoped threads with no locking. Evaluation order
//! never affects the result: the same population always produces the same
//! records, sequentially or in parallel.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use neuroracer_engine::{EpisodeRunner, SimConfig, Track};
use neuroracer_evolve::{Evolution, EvolutionError, FitnessRecord, Genome, GenomeId, NetworkController};

/// Cooperative stop signal shared between a front end and the training loop.
///
/// Cloning shares the flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    /// The generation was cancelled; partial results are discarded, never
    /// partially scored.
    #[display("evaluation cancelled before the generation completed")]
    Cancelled,
    /// A genome could not be compiled into a network. This is a
    /// generation-level fault in the evolution capability, not a bad drive,
    /// so it aborts the run instead of scoring a floor.
    #[display("compiling genome {id}: {source}")]
    Network {
        id: GenomeId,
        source: EvolutionError,
    },
}

/// Evaluates every genome of a generation against one track.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvaluator<'a> {
    track: &'a Track,
    config: &'a SimConfig,
}

impl<'a> PopulationEvaluator<'a> {
    #[must_use]
    pub fn new(track: &'a Track, config: &'a SimConfig) -> Self {
        Self { track, config }
    }

    /// Runs one episode per genome and returns exactly one record per
    /// submitted genome, in submission order.
    ///
    /// A genome that crashes on tick 0 still receives a record at the
    /// configured fitness floor. If `cancel` fires mid-generation the whole
    /// generation is discarded.
    pub fn evaluate<E>(
        &self,
        genomes: &[Genome],
        evolution: &E,
        cancel: &CancelToken,
    ) -> Result<Vec<FitnessRecord>, EvaluationError>
    where
        E: Evolution,
    {
        // Compile on the caller's thread: a weight-count mismatch is fatal
        // before any episode runs.
        let mut jobs = Vec::with_capacity(genomes.len());
        for genome in genomes {
            let network = evolution
                .network(genome)
                .map_err(|source| EvaluationError::Network {
                    id: genome.id(),
                    source,
                })?;
            jobs.push((genome.id(), network));
        }

        let mut records: Vec<Option<FitnessRecord>> = genomes.iter().map(|_| None).collect();
        thread::scope(|s| {
            for (slot, (id, network)) in records.iter_mut().zip(jobs) {
                s.spawn(move || {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let mut controller = NetworkController::new(network);
                    let mut runner = EpisodeRunner::new(self.track, self.config);
                    let summary = runner.run(&mut controller);
                    *slot = Some(FitnessRecord {
                        genome: id,
                        fitness: self.config.fitness.score(&summary),
                        summary,
                    });
                });
            }
        });

        if cancel.is_cancelled() {
            return Err(EvaluationError::Cancelled);
        }
        // Not cancelled, so every worker filled its slot.
        Ok(records.into_iter().map(|record| record.unwrap()).collect())
    }
}
