use super::types::{Observation, ObservationStore};
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Get the default observation path (~/.config/liquidity-score/observations.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("observations.json")
}

/// Load observations written by the fetch collaborator.
///
/// `path` is either a single JSON file mapping indicator code to an array of
/// `{date, value}` objects, or a directory holding one `<CODE>.json` array
/// per indicator.
pub fn load_observations(path: &Path) -> Result<ObservationStore, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.display().to_string()));
    }

    let mut store = ObservationStore::new();
    if path.is_dir() {
        load_directory(path, &mut store)?;
    } else {
        let series: BTreeMap<String, Vec<Observation>> = read_json(path)?;
        for (code, observations) in series {
            insert_series(&mut store, &code, observations);
        }
    }

    tracing::info!(
        path = %path.display(),
        indicators = store.codes().count(),
        observations = store.total_observations(),
        "loaded observations"
    );
    Ok(store)
}

fn load_directory(dir: &Path, store: &mut ObservationStore) -> Result<(), StoreError> {
    let pattern = dir.join("*.json");
    let entries = glob::glob(&pattern.to_string_lossy())?;

    for entry in entries {
        let file = match entry {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        let code = file
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::Code(file.display().to_string()))?
            .to_string();
        let observations: Vec<Observation> = read_json(&file)?;
        insert_series(store, &code, observations);
    }
    Ok(())
}

fn insert_series(store: &mut ObservationStore, code: &str, observations: Vec<Observation>) {
    let total = observations.len();
    let kept = store.extend(code, observations);
    if kept < total {
        tracing::warn!(indicator = code, dropped = total - kept, "dropped non-finite values");
    }
    tracing::debug!(indicator = code, observations = kept, "loaded series");
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Parse {
        path: path.display().to_string(),
        source,
    })
}
