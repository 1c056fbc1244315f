use std::{path::PathBuf, time::Instant};

use neuroracer_evolve::GaEvolution;
use neuroracer_training::{CancelToken, Trainer, TrainingConfig};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration JSON; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Track JSON; defaults to the built-in square loop
    #[arg(long)]
    track: Option<PathBuf>,
    /// Checkpoint output path, rewritten after every generation
    #[arg(long, default_value = "best-genome.json")]
    output: PathBuf,
    /// Override the configured generation cap
    #[arg(long)]
    generations: Option<usize>,
    /// Override the configured evolution seed
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let mut config: TrainingConfig = match &arg.config {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainingConfig::default(),
    };
    if let Some(generations) = arg.generations {
        config.generation_cap = generations;
    }
    if let Some(seed) = arg.seed {
        config.seed = seed;
    }
    let track = util::load_track(arg.track.as_deref())?;

    let mut evolution = GaEvolution::new(config.network_shape(), config.ga, config.seed)?;
    let trainer = Trainer::new(&track, &config)?.with_checkpoint(&arg.output, "neuroracer");

    eprintln!(
        "Training up to {} generations of {} genomes (seed {})",
        config.generation_cap, config.ga.population_size, config.seed,
    );
    let started = Instant::now();
    let outcome = trainer.run(&mut evolution, &CancelToken::new(), |report| {
        eprintln!("Generation #{}:", report.generation);
        eprintln!(
            "  Fitness: best {:.3} / mean {:.3} / median {:.3} / worst {:.3}",
            report.fitness.max, report.fitness.mean, report.fitness.median, report.fitness.min,
        );
        eprintln!("  Best genome: #{}", report.best_genome);
    })?;

    eprintln!();
    eprintln!("Training completed in {:.1?}", started.elapsed());
    eprintln!(
        "  Best fitness: {:.3} (generation {})",
        outcome.best.fitness, outcome.best.generation,
    );
    eprintln!("  Checkpoint: {}", arg.output.display());

    Ok(())
}
