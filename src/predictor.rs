use ndarray::Array1;
use std::path::Path;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::{ArtifactError, PredictError};
use crate::model::MarksModel;
use crate::scaler::StandardScaler;

/// Column order the model and scaler were fitted with.
pub const FEATURE_NAMES: [&str; 5] = ["age", "year1_marks", "year2_marks", "study_time", "failures"];

/// One student's attributes, built per request and dropped after the response.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub name: Option<String>,
    pub age: i64,
    pub year1_marks: f64,
    pub year2_marks: f64,
    pub study_time: f64,
    pub failures: i64,
}

impl StudentRecord {
    pub fn features(&self) -> Array1<f64> {
        Array1::from(vec![
            self.age as f64,
            self.year1_marks,
            self.year2_marks,
            self.study_time,
            self.failures as f64,
        ])
    }
}

/// Loaded model and scaler. Immutable after construction and shared by
/// every request through an `Arc`.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: MarksModel,
    scaler: StandardScaler,
}

impl Predictor {
    pub fn new(model: MarksModel, scaler: StandardScaler) -> Result<Self, ArtifactError> {
        let expected = FEATURE_NAMES.len();
        if scaler.n_features() != expected {
            return Err(ArtifactError::Invalid(format!(
                "scaler expects {} features, the service provides {expected}",
                scaler.n_features()
            )));
        }
        if model.n_inputs() != expected {
            return Err(ArtifactError::Invalid(format!(
                "model expects {} features, the service provides {expected}",
                model.n_inputs()
            )));
        }
        Ok(Self { model, scaler })
    }

    pub fn load(model_path: impl AsRef<Path>, scaler_path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let model = MarksModel::load(model_path)?;
        let scaler = StandardScaler::load(scaler_path)?;
        Self::new(model, scaler)
    }

    pub fn predict(&self, record: &StudentRecord) -> Result<f64, PredictError> {
        let scaled = self.scaler.transform(record.features().view())?;
        let value = self.model.predict(scaled.view())?;
        if !value.is_finite() {
            return Err(PredictError::NonFinite(value));
        }
        log::info!("Prediction successful: {}", value);
        Ok(value)
    }
}

/// Load the artifacts named in `cfg`. Failure is logged and leaves the
/// service without a predictor; it never aborts startup.
pub fn load_artifacts(cfg: &ServiceConfig) -> Option<Arc<Predictor>> {
    match Predictor::load(&cfg.model_path, &cfg.scaler_path) {
        Ok(predictor) => {
            log::info!(
                "Model and scaler loaded successfully ({}, {})",
                cfg.model_path.display(),
                cfg.scaler_path.display()
            );
            Some(Arc::new(predictor))
        }
        Err(e) => {
            log::error!("Error loading model or scaler: {}", e);
            None
        }
    }
}

/// Round to two decimal places, halves away from zero. Magnitudes of 1e15
/// and above carry no cents and are returned unchanged, which also keeps
/// `value * 100.0` from overflowing.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e15 {
        return value;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn record() -> StudentRecord {
        StudentRecord {
            name: Some("Ana".into()),
            age: 18,
            year1_marks: 12.0,
            year2_marks: 13.0,
            study_time: 2.0,
            failures: 0,
        }
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler::new(Array1::zeros(5), Array1::ones(5)).unwrap()
    }

    #[test]
    fn features_follow_fixed_column_order() {
        assert_eq!(record().features(), array![18.0, 12.0, 13.0, 2.0, 0.0]);
    }

    #[test]
    fn prediction_scales_before_the_model() {
        let scaler = StandardScaler::new(array![18.0, 10.0, 10.0, 2.0, 0.0], array![1.0, 2.0, 3.0, 1.0, 1.0]).unwrap();
        let model = MarksModel::linear(array![0.0, 1.0, 1.0, 0.0, 0.0], 10.0).unwrap();
        let predictor = Predictor::new(model, scaler).unwrap();
        // (12-10)/2 + (13-10)/3 + 10
        assert_eq!(predictor.predict(&record()).unwrap(), 12.0);
    }

    #[test]
    fn repeated_predictions_are_identical() {
        let model = MarksModel::linear(array![0.1, 0.4, 0.5, 0.3, -1.2], 0.7).unwrap();
        let predictor = Predictor::new(model, identity_scaler()).unwrap();
        let first = predictor.predict(&record()).unwrap();
        assert_eq!(first, predictor.predict(&record()).unwrap());
    }

    #[test]
    fn artifacts_must_match_the_feature_count() {
        let model = MarksModel::linear(array![1.0, 1.0], 0.0).unwrap();
        assert!(Predictor::new(model, identity_scaler()).is_err());

        let model = MarksModel::linear(Array1::ones(5), 0.0).unwrap();
        let scaler = StandardScaler::new(Array1::zeros(4), Array1::ones(4)).unwrap();
        assert!(Predictor::new(model, scaler).is_err());
    }

    #[test]
    fn overflowing_inputs_are_a_non_finite_error() {
        let model = MarksModel::linear(Array1::ones(5), 0.0).unwrap();
        let predictor = Predictor::new(model, identity_scaler()).unwrap();
        let mut huge = record();
        huge.year1_marks = f64::MAX;
        huge.year2_marks = f64::MAX;
        assert!(matches!(predictor.predict(&huge), Err(PredictError::NonFinite(_))));
    }

    #[test]
    fn missing_artifacts_leave_no_predictor() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServiceConfig {
            model_path: dir.path().join("missing_model.bin"),
            scaler_path: dir.path().join("missing_scaler.bin"),
            ..ServiceConfig::default()
        };
        assert!(load_artifacts(&cfg).is_none());
    }

    #[test]
    fn load_artifacts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServiceConfig {
            model_path: dir.path().join("model.bin"),
            scaler_path: dir.path().join("scaler.bin"),
            ..ServiceConfig::default()
        };
        MarksModel::linear(Array1::ones(5), 1.0).unwrap().save(&cfg.model_path).unwrap();
        identity_scaler().save(&cfg.scaler_path).unwrap();
        let predictor = load_artifacts(&cfg).expect("artifacts load");
        assert_eq!(predictor.predict(&record()).unwrap(), 46.0);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(7.0), 7.0);
    }

    #[test]
    fn rounding_huge_values_stays_finite() {
        assert_eq!(round2(1e307), 1e307);
        assert_eq!(round2(-f64::MAX), -f64::MAX);
        assert_eq!(round2(1e15 + 0.5), 1e15 + 0.5);
    }

    #[test]
    fn mismatched_artifacts_on_disk_leave_no_predictor() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServiceConfig {
            model_path: dir.path().join("model.bin"),
            scaler_path: dir.path().join("scaler.bin"),
            ..ServiceConfig::default()
        };
        MarksModel::linear(Array1::ones(5), 1.0).unwrap().save(&cfg.model_path).unwrap();
        StandardScaler::new(Array1::zeros(4), Array1::ones(4))
            .unwrap()
            .save(&cfg.scaler_path)
            .unwrap();
        assert!(load_artifacts(&cfg).is_none());
    }
}
