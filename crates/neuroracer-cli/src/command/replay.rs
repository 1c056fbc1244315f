use std::path::PathBuf;

use neuroracer_engine::run_episode;
use neuroracer_training::{Checkpoint, TrainingConfig};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Checkpoint JSON produced by training
    #[arg(long)]
    model: PathBuf,
    /// Training configuration JSON; only the simulation section is used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Track JSON; defaults to the built-in square loop
    #[arg(long)]
    track: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let config: TrainingConfig = match &arg.config {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainingConfig::default(),
    };
    let track = util::load_track(arg.track.as_deref())?;

    let checkpoint = Checkpoint::load(&arg.model)?;
    eprintln!(
        "Replaying {} (generation {}, trained {}, fitness {:.3})",
        checkpoint.name, checkpoint.generation, checkpoint.trained_at, checkpoint.fitness,
    );

    let mut controller = checkpoint.into_controller()?;
    let result = run_episode(&mut controller, &track, &config.sim)?;

    println!("Outcome:  {:?}", result.summary.state);
    println!("Ticks:    {}", result.summary.ticks);
    println!("Progress: {:.1}", result.summary.progress);
    println!("Distance: {:.1}", result.summary.distance);
    println!("Laps:     {}", result.summary.laps);
    println!("Fitness:  {:.3}", result.fitness);

    Ok(())
}
