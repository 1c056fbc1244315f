//! Genetic-algorithm implementation of the [`Evolution`] capability.
//!
//! Generation cycle: rank the previous population by the fitness feedback,
//! carry the elites over unchanged, then fill the rest with offspring from
//! tournament-selected parents via BLX-α crossover and Gaussian mutation.
//! Mutation strength follows a three-phase schedule (exploration,
//! transition, convergence) so early generations search broadly and late
//! ones fine-tune.
//!
//! All randomness flows through a seedable PCG generator: the same seed
//! produces the same sequence of populations, which combined with the
//! deterministic simulation makes whole training runs reproducible.

use rand::{Rng, SeedableRng, seq::IndexedRandom};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    Evolution, EvolutionError, FitnessRecord, Genome, GenomeId,
    network::{FeedForwardNetwork, NetworkShape},
    weights,
};

/// Mutation sigma by generation: wide early, narrow late.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationSchedule {
    pub exploration_sigma: f32,
    pub transition_sigma: f32,
    pub convergence_sigma: f32,
    /// First generation of the transition phase.
    pub transition_at: usize,
    /// First generation of the convergence phase.
    pub convergence_at: usize,
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            exploration_sigma: 0.5,
            transition_sigma: 0.2,
            convergence_sigma: 0.05,
            transition_at: 30,
            convergence_at: 80,
        }
    }
}

impl MutationSchedule {
    #[must_use]
    pub fn sigma_for(&self, generation: usize) -> f32 {
        if generation < self.transition_at {
            self.exploration_sigma
        } else if generation < self.convergence_at {
            self.transition_sigma
        } else {
            self.convergence_sigma
        }
    }

    fn is_valid(&self) -> bool {
        [
            self.exploration_sigma,
            self.transition_sigma,
            self.convergence_sigma,
        ]
        .iter()
        .all(|s| s.is_finite() && *s > 0.0)
    }
}

/// Genetic-algorithm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    /// Individuals per generation.
    pub population_size: usize,
    /// Top individuals carried over unchanged.
    pub elite_count: usize,
    /// Individuals per selection tournament; larger means stronger pressure.
    pub tournament_size: usize,
    /// Weight magnitude bound.
    pub max_weight: f32,
    /// BLX-α range expansion factor.
    pub blx_alpha: f32,
    /// Per-weight mutation probability.
    pub mutation_rate: f32,
    pub mutation: MutationSchedule,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            elite_count: 2,
            tournament_size: 3,
            max_weight: 5.0,
            blx_alpha: 0.3,
            mutation_rate: 0.15,
            mutation: MutationSchedule::default(),
        }
    }
}

impl GaParams {
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.population_size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.elite_count >= self.population_size {
            return Err(EvolutionError::EliteCountTooLarge {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(EvolutionError::ZeroTournament);
        }
        let operators_valid = self.max_weight.is_finite()
            && self.max_weight > 0.0
            && self.blx_alpha.is_finite()
            && self.blx_alpha >= 0.0
            && self.mutation_rate.is_finite()
            && (0.0..=1.0).contains(&self.mutation_rate)
            && self.mutation.is_valid();
        if !operators_valid {
            return Err(EvolutionError::InvalidOperatorParameter);
        }
        Ok(())
    }
}

/// The shipped [`Evolution`] implementation.
#[derive(Debug, Clone)]
pub struct GaEvolution {
    shape: NetworkShape,
    params: GaParams,
    rng: Pcg64Mcg,
    previous: Vec<Genome>,
    generation: usize,
    next_id: u64,
}

impl GaEvolution {
    pub fn new(shape: NetworkShape, params: GaParams, seed: u64) -> Result<Self, EvolutionError> {
        params.validate()?;
        Ok(Self {
            shape,
            params,
            rng: Pcg64Mcg::seed_from_u64(seed),
            previous: Vec::new(),
            generation: 0,
            next_id: 0,
        })
    }

    #[must_use]
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    fn fresh_id(&mut self) -> GenomeId {
        let id = GenomeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_population(&mut self) -> Vec<Genome> {
        (0..self.params.population_size)
            .map(|_| {
                let id = self.fresh_id();
                Genome::new(
                    id,
                    weights::random(
                        &mut self.rng,
                        self.params.max_weight,
                        self.shape.weight_count(),
                    ),
                )
            })
            .collect()
    }

    fn breed(&mut self, ranked: &[(&Genome, f32)]) -> Vec<Genome> {
        let sigma = self.params.mutation.sigma_for(self.generation);
        let mut next = Vec::with_capacity(self.params.population_size);

        // Elites survive unchanged, ids included.
        next.extend(
            ranked[..self.params.elite_count]
                .iter()
                .map(|(genome, _)| (*genome).clone()),
        );

        while next.len() < self.params.population_size {
            let p1 = tournament_select(ranked, self.params.tournament_size, &mut self.rng);
            let p2 = tournament_select(ranked, self.params.tournament_size, &mut self.rng);
            let mut child = weights::blx_alpha(
                p1.weights(),
                p2.weights(),
                self.params.blx_alpha,
                self.params.max_weight,
                &mut self.rng,
            );
            weights::mutate(
                &mut child,
                sigma,
                self.params.max_weight,
                self.params.mutation_rate,
                &mut self.rng,
            );
            let id = self.fresh_id();
            next.push(Genome::new(id, child));
        }
        next
    }
}

impl Evolution for GaEvolution {
    fn next_population(&mut self, feedback: &[FitnessRecord]) -> Result<Vec<Genome>, EvolutionError> {
        let population = if self.previous.is_empty() || feedback.is_empty() {
            self.random_population()
        } else {
            let previous = std::mem::take(&mut self.previous);
            let ranked = rank(&previous, feedback)?;
            self.breed(&ranked)
        };
        self.generation += 1;
        self.previous = population.clone();
        Ok(population)
    }

    fn network(&self, genome: &Genome) -> Result<FeedForwardNetwork, EvolutionError> {
        FeedForwardNetwork::new(self.shape, genome.weights().to_vec())
    }
}

/// Pairs genomes with their fitness feedback, best first.
///
/// Every genome must have a record; a missing id means the caller fed back
/// fitness for a different population, which is fatal.
fn rank<'a>(
    previous: &'a [Genome],
    feedback: &[FitnessRecord],
) -> Result<Vec<(&'a Genome, f32)>, EvolutionError> {
    let mut ranked = Vec::with_capacity(previous.len());
    for genome in previous {
        let record = feedback
            .iter()
            .find(|record| record.genome == genome.id())
            .ok_or(EvolutionError::UnknownGenome { id: genome.id() })?;
        ranked.push((genome, record.fitness));
    }
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked)
}

/// Tournament selection: the fittest of `tournament_size` random picks.
fn tournament_select<'a, R>(
    ranked: &[(&'a Genome, f32)],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Genome
where
    R: Rng + ?Sized,
{
    ranked
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(genome, _)| *genome)
        .unwrap()
}
