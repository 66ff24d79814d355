//! Reading and writing persisted model/scaler files.
//!
//! Artifacts are bincode by default. A `.json` extension switches to JSON so
//! that parameters exported by an external training pipeline can be dropped in
//! without a conversion step.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::ArtifactError;

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = if is_json(path) {
        serde_json::from_slice(&bytes).map_err(|e| e.to_string())
    } else {
        bincode::deserialize(&bytes).map_err(|e| e.to_string())
    };
    decoded.map_err(|reason| ArtifactError::Decode {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn write<T: Serialize>(value: &T, path: &Path) -> Result<(), ArtifactError> {
    let data = if is_json(path) {
        serde_json::to_vec_pretty(value).map_err(|e| ArtifactError::Encode(e.to_string()))?
    } else {
        bincode::serialize(value).map_err(|e| ArtifactError::Encode(e.to_string()))?
    };
    fs::write(path, data).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
