//! JSON HTTP API.
//!
//! Exposes the session over HTTP so a browser front-end (or `curl`) can
//! log symptoms, browse history, and list nearby clinics. One session is
//! shared by all requests behind an async mutex, which serializes
//! submissions: one in flight, one history record per request.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/tips` | Log symptoms `{ "symptoms": "…" }`, returns the new record |
//! | `GET`  | `/history` | All records, newest first |
//! | `GET`  | `/history/{id}` | One record |
//! | `GET`  | `/history/{id}/share` | Share text for one record |
//! | `GET`  | `/clinics?lat=&lng=` | Ranked facilities around the query or session location |
//! | `GET`  | `/emergency` | Emergency contacts with dial links |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "symptoms must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//! Malformed JSON bodies and query strings are reported as `bad_request`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::contacts::{
    dial_link, directions_url, maps_search_url, EMERGENCY_CONTACTS, EMERGENCY_NOTICE,
};
use crate::directory::{create_directory, FacilityDirectory};
use crate::display::entry_count_label;
use crate::location::resolve_provider;
use crate::models::{Coordinate, RankedFacility, SymptomRecord};
use crate::session::{nearby_facilities_from, Session};
use crate::share::format_for_sharing;
use crate::storage::{FileStorage, Storage};

/// The session type served over HTTP.
pub type SharedSession = Arc<Mutex<Session<Arc<dyn Storage>>>>;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub directory: Arc<dyn FacilityDirectory>,
}

impl AppState {
    pub fn new(session: Session<Arc<dyn Storage>>, directory: Arc<dyn FacilityDirectory>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            directory,
        }
    }
}

/// Build the router with CORS open to all origins.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/tips", post(handle_tips))
        .route("/history", get(handle_history))
        .route("/history/{id}", get(handle_history_entry))
        .route("/history/{id}/share", get(handle_share))
        .route("/clinics", get(handle_clinics))
        .route("/emergency", get(handle_emergency))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` with file-backed history.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.history.dir.clone()));
    let mut session = Session::start(storage, config);
    session
        .acquire_location(resolve_provider(config, None).as_ref())
        .await;

    let directory: Arc<dyn FacilityDirectory> = Arc::from(create_directory(&config.directory)?);
    let app = router(AppState::new(session, directory));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "server listening");
    println!("Health Buddy API listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

// ============ Handlers ============

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Deserialize)]
struct TipsRequest {
    symptoms: String,
}

async fn handle_tips(
    State(state): State<AppState>,
    req: Result<Json<TipsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SymptomRecord>), AppError> {
    let Json(req) = req.map_err(|rejection| bad_request(rejection.body_text()))?;
    if req.symptoms.trim().is_empty() {
        return Err(bad_request("symptoms must not be empty"));
    }

    let mut session = state.session.lock().await;
    let record = session
        .submit(&req.symptoms)
        .await
        .map_err(|e| internal(format!("{:#}", e)))?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Serialize)]
struct HistoryResponse {
    count: usize,
    label: String,
    records: Vec<SymptomRecord>,
}

async fn handle_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let session = state.session.lock().await;
    let records = session.history().records().to_vec();
    Json(HistoryResponse {
        count: records.len(),
        label: entry_count_label(records.len()),
        records,
    })
}

async fn handle_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SymptomRecord>, AppError> {
    let session = state.session.lock().await;
    session
        .history()
        .select_for_replay(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("history entry not found: {}", id)))
}

async fn handle_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.session.lock().await;
    let record = session
        .history()
        .select_for_replay(&id)
        .ok_or_else(|| not_found(format!("history entry not found: {}", id)))?;
    Ok(Json(json!({ "text": format_for_sharing(&record.tips) })))
}

#[derive(Deserialize)]
struct ClinicsQuery {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Serialize)]
struct ClinicEntry {
    #[serde(flatten)]
    ranked: RankedFacility,
    directions_url: String,
}

#[derive(Serialize)]
struct ClinicsResponse {
    origin: Coordinate,
    facilities: Vec<ClinicEntry>,
    maps_url: String,
}

async fn handle_clinics(
    State(state): State<AppState>,
    query: Result<Query<ClinicsQuery>, QueryRejection>,
) -> Result<Json<ClinicsResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => {
            let coord = Coordinate::new(lat, lng);
            if !coord.is_valid() {
                return Err(bad_request("lat must be in [-90, 90] and lng in [-180, 180]"));
            }
            coord
        }
        (None, None) => state
            .session
            .lock()
            .await
            .location()
            .ok_or_else(|| bad_request("location is required to show nearby clinics"))?,
        _ => return Err(bad_request("lat and lng must be given together")),
    };

    let facilities = nearby_facilities_from(origin, state.directory.as_ref())
        .await
        .into_iter()
        .map(|ranked| ClinicEntry {
            directions_url: directions_url(origin, &ranked),
            ranked,
        })
        .collect();

    Ok(Json(ClinicsResponse {
        origin,
        facilities,
        maps_url: maps_search_url(origin),
    }))
}

async fn handle_emergency() -> Json<serde_json::Value> {
    let contacts: Vec<serde_json::Value> = EMERGENCY_CONTACTS
        .iter()
        .map(|c| {
            json!({
                "name": c.name,
                "number": c.number,
                "description": c.description,
                "dial": dial_link(c.number),
            })
        })
        .collect();
    Json(json!({ "contacts": contacts, "notice": EMERGENCY_NOTICE }))
}
