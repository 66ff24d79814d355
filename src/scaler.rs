use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifact;
use crate::error::{ArtifactError, PredictError};

/// Fitted standardization: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.is_empty() {
            return Err(ArtifactError::Invalid("scaler has no columns".into()));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactError::Invalid("scaler contains non-finite parameters".into()));
        }
        Ok(())
    }

    pub fn transform(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, PredictError> {
        if row.len() != self.n_features() {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_features(),
                got: row.len(),
            });
        }
        // Constant columns were fitted with a zero scale; leave them centred only.
        Ok(Zip::from(&row)
            .and(&self.mean)
            .and(&self.scale)
            .map_collect(|&x, &m, &s| if s == 0.0 { x - m } else { (x - m) / s }))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let scaler: Self = artifact::read(path.as_ref())?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        artifact::write(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_each_column() {
        let scaler = StandardScaler::new(array![10.0, 2.0], array![2.0, 0.5]).unwrap();
        let out = scaler.transform(array![14.0, 1.0].view()).unwrap();
        assert_eq!(out, array![2.0, -2.0]);
    }

    #[test]
    fn zero_scale_column_is_only_centred() {
        let scaler = StandardScaler::new(array![3.0], array![0.0]).unwrap();
        let out = scaler.transform(array![5.0].view()).unwrap();
        assert_eq!(out, array![2.0]);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let scaler = StandardScaler::new(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
        let err = scaler.transform(array![1.0, 2.0, 3.0].view()).unwrap_err();
        assert_eq!(err, PredictError::ShapeMismatch { expected: 2, got: 3 });
    }

    #[test]
    fn mismatched_parameters_do_not_validate() {
        assert!(StandardScaler::new(array![0.0, 1.0], array![1.0]).is_err());
        assert!(StandardScaler::new(array![f64::NAN], array![1.0]).is_err());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.bin");
        let scaler = StandardScaler::new(array![1.0, 2.0], array![3.0, 4.0]).unwrap();
        scaler.save(&path).unwrap();
        assert_eq!(StandardScaler::load(&path).unwrap(), scaler);
    }
}
