use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use helsi_core::config::ProgressionConfig;
use helsi_core::{
    compute_progression, Catalog, Error, Exercise, JsonFileStore, ProgressionReport, Result,
    Session, SessionStore,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(err: Error) -> Self {
        tracing::error!("Request failed: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and payloads
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    store: Arc<JsonFileStore>,
    progression: Arc<ProgressionConfig>,
    /// Serialises load-modify-save of the history within this process
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(catalog: Catalog, store: JsonFileStore, progression: ProgressionConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: Arc::new(store),
            progression: Arc::new(progression),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// A logged workout as posted by the front end
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkoutLog {
    pub date: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl WorkoutLog {
    fn into_session(self) -> std::result::Result<Session, AppError> {
        let day = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::bad_request(format!("Failed to parse date: {}", e)))?;
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::bad_request("Failed to parse date"))?;

        if self.name.trim().is_empty() {
            return Err(AppError::bad_request("Workout name is empty"));
        }
        for exercise in &self.exercises {
            if exercise.reps.len() != exercise.weights.len() {
                return Err(AppError::bad_request(format!(
                    "'{}' has {} reps but {} weights",
                    exercise.name,
                    exercise.reps.len(),
                    exercise.weights.len()
                )));
            }
        }

        Ok(Session {
            date: Some(Utc.from_utc_datetime(&midnight)),
            exercises: self.exercises,
            name: self.name,
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/workouts", get(list_workouts))
        .route("/api/log", post(log_workout))
        .route("/api/progression", get(progression))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .map_err(|e| Error::Config(format!("invalid bind address {bind}:{port}: {e}")))?;
    tracing::info!("helsi serve listening on http://{addr}");
    println!("Starting web server on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("helsi serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_workouts(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.catalog.sessions.clone())
}

async fn log_workout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WorkoutLog>, JsonRejection>,
) -> std::result::Result<Json<serde_json::Value>, AppError> {
    let Json(log) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let session = log.into_session()?;
    tracing::info!("Logging {} via HTTP", session.name);

    let store = state.store.clone();
    let lock = state.write_lock.clone();
    tokio::task::spawn_blocking(move || {
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        store.append(session)
    })
    .await
    .map_err(|e| AppError::internal(Error::PersistenceFailure(e.to_string())))?
    .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "status": "Workout logged!" })))
}

async fn progression(
    State(state): State<AppState>,
) -> std::result::Result<Json<ProgressionReport>, AppError> {
    let store = state.store.clone();
    let history = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| AppError::internal(Error::StoreUnavailable(e.to_string())))?
        .map_err(AppError::internal)?;

    Ok(Json(compute_progression(
        &history,
        Utc::now(),
        &state.progression,
    )))
}
