//! Final marks prediction service.
//!
//! - Model and scaler loaded once at startup from fixed artifact files
//! - `POST /predict` coerces five student attributes, scales them and runs
//!   the regression model
//! - `GET /` serves the prediction form
//!
//! The loaded [`Predictor`] is handed to the HTTP layer through
//! [`server::AppState`]; a failed load leaves it unset and every prediction
//! request answers 500 until the process is restarted with valid artifacts.

pub mod artifact;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod predictor;
pub mod request;
pub mod scaler;
pub mod server;

pub use config::ServiceConfig;
pub use error::{ArtifactError, PredictError, RequestError};
pub use model::{Activation, DenseLayer, MarksModel};
pub use predictor::{load_artifacts, round2, Predictor, StudentRecord, FEATURE_NAMES};
pub use scaler::StandardScaler;
