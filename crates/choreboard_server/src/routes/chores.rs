//! Chore registry and completion ledger endpoints.

use super::current_family_id;
use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use choreboard_core::{
    CategoryId, ChoreDraft, ChoreFilter, ChoreId, ChorePatch, CompletionQuery, Frequency,
    SqliteChoreService, ValidationErrors,
};
use serde::Deserialize;
use serde_json::{json, Value};

type JsonResponse = Result<Json<Value>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListParams {
    active: Option<String>,
    category_id: Option<CategoryId>,
    frequency: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> Result<ChoreFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let frequency = match self.frequency.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => match value.parse::<Frequency>() {
                Ok(frequency) => Some(frequency),
                Err(_) => {
                    errors.add(
                        "frequency",
                        "The frequency must be one of daily, weekly, monthly, semiannual.",
                    );
                    None
                }
            },
        };
        errors.into_result(ChoreFilter {
            active: self.active.as_deref().and_then(parse_flag),
            category_id: self.category_id,
            frequency,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct HistoryParams {
    chore_id: Option<ChoreId>,
    period_key: Option<String>,
    limit: Option<u32>,
}

/// Lenient boolean query flag; unrecognized values leave the filter unset.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub(super) async fn index(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> JsonResponse {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    let chores = state
        .run(move |conn, _now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.list_chores(family_id, &filter)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "chores": chores,
    })))
}

pub(super) async fn active(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> JsonResponse {
    let view = state
        .run(move |conn, now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.active_view(family_id, now)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "pending": view.pending,
        "completions": view.recently_completed,
    })))
}

pub(super) async fn completed(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> JsonResponse {
    let Query(params) = params?;
    let query = CompletionQuery {
        chore_id: params.chore_id,
        period_key: params.period_key.filter(|key| !key.trim().is_empty()),
        limit: params.limit,
    };
    let completions = state
        .run(move |conn, _now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.completion_history(family_id, &query)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "completions": completions,
    })))
}

pub(super) async fn store(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<ChoreDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(draft) = body?;
    let chore = state
        .run(move |conn, now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.create_chore(family_id, user_id, &draft, now)?)
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": "ok",
            "chore": chore,
        })),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    chore_id: Result<Path<ChoreId>, PathRejection>,
    body: Result<Json<ChorePatch>, JsonRejection>,
) -> JsonResponse {
    let Path(chore_id) = chore_id?;
    let Json(patch) = body?;
    let chore = state
        .run(move |conn, now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.update_chore(chore_id, family_id, &patch, now)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "chore": chore,
    })))
}

pub(super) async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    chore_id: Result<Path<ChoreId>, PathRejection>,
) -> JsonResponse {
    let Path(chore_id) = chore_id?;
    state
        .run(move |conn, _now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.delete_chore(chore_id, family_id)?)
        })
        .await?;

    Ok(Json(json!({ "success": "ok" })))
}

pub(super) async fn complete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    chore_id: Result<Path<ChoreId>, PathRejection>,
) -> JsonResponse {
    let Path(chore_id) = chore_id?;
    let completion = state
        .run(move |conn, now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.complete(chore_id, family_id, user_id, now)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "completion": completion,
    })))
}

pub(super) async fn uncomplete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    chore_id: Result<Path<ChoreId>, PathRejection>,
) -> JsonResponse {
    let Path(chore_id) = chore_id?;
    let period_key = state
        .run(move |conn, now| {
            let family_id = current_family_id(conn, user_id)?;
            let service = SqliteChoreService::from_connection(conn)?;
            Ok(service.uncomplete(chore_id, family_id, now)?)
        })
        .await?;

    Ok(Json(json!({
        "success": "ok",
        "completion": null,
        "period_key": period_key,
    })))
}

#[cfg(test)]
mod tests {
    use super::{parse_flag, ListParams};
    use choreboard_core::Frequency;

    #[test]
    fn flag_parsing_is_lenient() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn list_params_validate_frequency() {
        let filter = ListParams {
            active: Some("yes".to_string()),
            frequency: Some("weekly".to_string()),
            ..ListParams::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.active, Some(true));
        assert_eq!(filter.frequency, Some(Frequency::Weekly));

        let errors = ListParams {
            frequency: Some("hourly".to_string()),
            ..ListParams::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(errors.contains("frequency"));
    }
}
