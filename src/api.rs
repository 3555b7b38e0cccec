//! HTTP API endpoints and router assembly.
//!
//! The JSON routes back the stage picker, the country code picker and
//! state polling for a running call. Everything live goes over `/ws`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::countries::{filter_countries, CountryListing};
use crate::state::AppState;
use crate::types::{StageId, OPTION_COUNT};
use crate::ws;

/// Stage summary for the stage picker
#[derive(Debug, Clone, Serialize)]
pub struct StageInfo {
    pub id: StageId,
    pub name: String,
    pub question_count: usize,
    pub option_count: usize,
}

/// List the stage catalog.
///
/// GET /api/stages
pub async fn list_stages(State(state): State<Arc<AppState>>) -> Json<Vec<StageInfo>> {
    let stages = state
        .catalog
        .iter()
        .map(|s| StageInfo {
            id: s.id.clone(),
            name: s.name.clone(),
            question_count: s.questions.len(),
            option_count: OPTION_COUNT,
        })
        .collect();
    Json(stages)
}

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    #[serde(default)]
    pub q: String,
    /// Drop the cached list and fetch again
    #[serde(default)]
    pub refresh: bool,
}

/// Search country dial codes.
///
/// GET /api/countries?q=<name or code>&refresh=<bool>
///
/// Always answers 200; when the upstream list is unavailable the built-in
/// list is served with `source: "fallback"` and an error message.
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Json<CountryListing> {
    if query.refresh {
        let mut listing = state.countries.refresh().await;
        listing.countries = filter_countries(&listing.countries, &query.q);
        return Json(listing);
    }
    Json(state.countries.search(&query.q).await)
}

/// Current game snapshot for a call.
///
/// GET /api/calls/{id}/state
pub async fn call_state(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.get_call(&id).await {
        Some(call) => Json(call.game.snapshot().await).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Call '{}' not found", id)).into_response(),
    }
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/stages", get(list_stages))
        .route("/api/countries", get(list_countries))
        .route("/api/calls/{id}/state", get(call_state))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
