use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::config::ServiceConfig;
use crate::error::{PredictError, RequestError};
use crate::predictor::{round2, Predictor};
use crate::request::{self, BodyFormat};

const INDEX_HTML: &str = include_str!("../static/index.html");
const SCRIPT_JS: &str = include_str!("../static/script.js");

/// Message returned for every server-side prediction failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Prediction failed due to internal error.";

/// Read-only state handed to every handler. `predictor` is `None` when the
/// artifacts failed to load at startup.
#[derive(Clone, Default)]
pub struct AppState {
    pub predictor: Option<Arc<Predictor>>,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(predictor: Option<Arc<Predictor>>) -> Self {
        Self {
            predictor,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PredictionResponse {
    pub prediction: f64,
}

enum ApiError {
    Request(RequestError),
    Predict(PredictError),
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError::Request(e)
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError::Predict(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Request(e) => {
                log::error!("Rejected request: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Predict(e) => {
                log::error!("Error during prediction: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(index))
        .route("/static/script.js", get(script))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state);
    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Serve `file` from the configured static directory, falling back to the
/// embedded copy.
async fn static_asset(state: &AppState, file: &str, embedded: &'static str) -> String {
    if let Some(dir) = &state.static_dir {
        let path = dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => return content,
            Err(e) => log::debug!("Using embedded {}: {} ({})", file, e, path.display()),
        }
    }
    embedded.to_string()
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(static_asset(&state, "index.html", INDEX_HTML).await)
}

async fn script(State(state): State<AppState>) -> impl IntoResponse {
    let body = static_asset(&state, "script.js", SCRIPT_JS).await;
    ([(header::CONTENT_TYPE, "application/javascript")], body)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": state.predictor.is_some(),
    }))
}

async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    log::debug!("Received data: {}", String::from_utf8_lossy(&body));
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let format = BodyFormat::from_content_type(content_type)?;
    let record = request::parse_body(format, &body)?;

    let predictor = state.predictor.as_deref().ok_or(PredictError::NotLoaded)?;
    let value = predictor.predict(&record)?;
    let prediction = round2(value);
    log::info!(
        "Prediction result for {}: {}",
        record.name.as_deref().unwrap_or("<unnamed>"),
        prediction
    );
    Ok(Json(PredictionResponse { prediction }))
}

/// Serve on an already bound listener until the future is dropped.
pub async fn serve_on(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(cfg: &ServiceConfig, predictor: Option<Arc<Predictor>>) -> anyhow::Result<()> {
    let state = AppState::new(predictor).with_static_dir(cfg.static_dir.clone());
    let app = router(state, cfg.cors);
    let addr = cfg.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("Service listening on {}", listener.local_addr()?);

    tokio::select! {
        res = serve_on(listener, app) => res?,
        _ = signal::ctrl_c() => {
            log::info!("Shutdown signal received");
        }
    }
    Ok(())
}
