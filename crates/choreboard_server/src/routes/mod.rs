//! HTTP router construction.
//!
//! # Invariants
//! - The current family is resolved once per request, inside the same
//!   storage call as the use-case, and passed down as an explicit id.
//! - Success bodies carry `"success": "ok"` next to their payload.

mod categories;
mod chores;

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use choreboard_core::repo::family_repo::SqliteFamilyRepository;
use choreboard_core::{FamilyId, FamilyService, UserId};
use log::info;
use rusqlite::Connection;
use serde_json::json;
use std::time::Instant;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chores", get(chores::index).post(chores::store))
        .route("/chores/active", get(chores::active))
        .route("/chores/completed", get(chores::completed))
        .route(
            "/chores/{id}",
            patch(chores::update).delete(chores::destroy),
        )
        .route("/chores/{id}/complete", post(chores::complete))
        .route("/chores/{id}/uncomplete", post(chores::uncomplete))
        .route(
            "/categories",
            get(categories::index).post(categories::store),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "success": "ok",
        "version": choreboard_core::core_version(),
    }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();
    let response = next.run(request).await;
    info!(
        "event=http_request module=server status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started_at.elapsed().as_millis()
    );
    response
}

/// Resolves the caller's current family or fails with `NoCurrentFamily`.
fn current_family_id(conn: &Connection, user_id: UserId) -> Result<FamilyId, ApiError> {
    let families = FamilyService::new(SqliteFamilyRepository::try_new(conn)?);
    Ok(families.current_family_or_fail(user_id)?.id)
}
