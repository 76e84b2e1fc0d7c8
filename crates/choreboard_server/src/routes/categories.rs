//! Category endpoints. Categories are shared across families.

use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use choreboard_core::SqliteChoreService;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub(super) struct NewCategory {
    title: Option<String>,
    ico: Option<String>,
}

pub(super) async fn index(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let items = state
        .run(|conn, _now| {
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.list_categories(true)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "items": items,
    })))
}

pub(super) async fn store(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = body?;
    let category = state
        .run(move |conn, now| {
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.create_category(input.title.as_deref(), input.ico.as_deref(), now)?)
        })
        .await?;
    info!(
        "event=category_create module=server status=ok category_id={} user_id={}",
        category.id, user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": "ok",
            "category": category,
        })),
    ))
}
