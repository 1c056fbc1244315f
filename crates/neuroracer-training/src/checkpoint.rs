//! Best-genome checkpoints: enough JSON to rebuild a driving controller
//! without re-running evolution.

use std::{fs, io, path::Path, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use neuroracer_evolve::{EvolutionError, FeedForwardNetwork, NetworkController, NetworkShape};

use crate::trainer::BestGenome;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CheckpointError {
    #[display("checkpoint file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("checkpoint JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A persisted best genome.
///
/// Written after every generation so an interrupted run keeps its progress;
/// [`Checkpoint::into_controller`] turns a loaded checkpoint straight into a
/// [`NetworkController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the best genome was found in.
    pub generation: usize,
    pub fitness: f32,
    pub shape: NetworkShape,
    pub weights: Vec<f32>,
}

impl Checkpoint {
    #[must_use]
    pub fn from_best(best: &BestGenome, shape: NetworkShape, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            generation: best.generation,
            fitness: best.fitness,
            shape,
            weights: best.genome.weights().to_vec(),
        }
    }

    pub fn save<P>(&self, path: P) -> Result<(), CheckpointError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| CheckpointError::Json {
            path: path.to_owned(),
            source,
        })?;
        fs::write(path, json).map_err(|source| CheckpointError::Io {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load<P>(path: P) -> Result<Self, CheckpointError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| CheckpointError::Json {
            path: path.to_owned(),
            source,
        })
    }

    /// Compiles the stored weights back into a driving controller.
    pub fn into_controller(self) -> Result<NetworkController, EvolutionError> {
        FeedForwardNetwork::new(self.shape, self.weights).map(NetworkController::new)
    }
}
