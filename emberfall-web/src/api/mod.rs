//! HTTP/JSON API layer.
//!
//! Exposes the game over JSON-over-HTTP: character creation and selection,
//! the hero home screen, damage/rest, item details, the inventory view,
//! and the polymorphic use-item endpoint. The original's cookie session is
//! modeled as a server-side selected-hero cell; the store file on disk is
//! shared with the healing daemon, which is signaled through the
//! single-slot command file. Handlers reload the save file before each
//! operation so heals written by the daemon are always visible.

pub mod hero;
pub mod item;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use emberfall_core::hero::HeroId;
use emberfall_core::store::StoreError;
use emberfall_core::{CommandChannel, Config, GameStore};

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<RwLock<GameStore>>,
    /// The hero the player is currently playing as.
    pub selected_hero: Arc<RwLock<Option<HeroId>>>,
    pub channel: Arc<CommandChannel>,
}

impl ApiState {
    pub fn new(store: GameStore, config: &Config) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            selected_hero: Arc::new(RwLock::new(None)),
            channel: Arc::new(CommandChannel::new(config.command_path())),
        }
    }
}

/// Errors surfaced to API clients as structured JSON.
#[derive(Debug)]
pub enum ApiError {
    /// No hero selected for a route that needs one.
    NoHeroSelected,
    NotFound(String),
    Validation(Vec<String>),
    BadRequest(String),
    /// Anything unexpected. Details go to the log, never to the client.
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::NoHeroSelected => (
                StatusCode::BAD_REQUEST,
                "No hero selected".to_string(),
                Vec::new(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what, Vec::new()),
            ApiError::Validation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
                details,
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, Vec::new()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
                Vec::new(),
            ),
        };
        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::HeroNotFound(id) => ApiError::NotFound(format!("Hero {id} not found")),
            StoreError::ItemNotFound(id) => ApiError::NotFound(format!("Item {id} not found")),
            StoreError::ClassNotFound(id) => {
                ApiError::NotFound(format!("Hero class {id} not found"))
            }
            StoreError::NameTaken(name) => {
                ApiError::Validation(vec![format!("the name {name:?} is already taken")])
            }
            err => {
                error!(%err, "store error");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(hero::routes())
        .merge(item::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on the configured address until the task is cancelled.
pub async fn start_api_server(
    state: ApiState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);
    let listener = TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
