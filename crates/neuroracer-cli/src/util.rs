use std::{
    fs::File,
    io,
    path::Path,
};

use anyhow::Context;
use neuroracer_engine::Track;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Loads a track JSON file, or the built-in square loop sized for the
/// default simulation configuration.
pub fn load_track(path: Option<&Path>) -> anyhow::Result<Track> {
    match path {
        Some(path) => read_json_file("track", path),
        None => Ok(Track::square_loop(1000.0, 150.0)),
    }
}
