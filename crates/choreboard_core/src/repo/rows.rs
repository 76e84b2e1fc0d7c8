//! Shared row projections for chore/category/completion joins.
//!
//! Queries select columns with the aliases below so one parser serves every
//! join shape.

use super::{RepoError, RepoResult};
use crate::model::chore::{Chore, ChoreWithCategory};
use crate::model::completion::ChoreCompletion;
use crate::model::family::Category;
use rusqlite::Row;

pub(crate) const CHORE_COLUMNS: &str = "
    ch.id AS chore_id,
    ch.family_id AS chore_family_id,
    ch.category_id AS chore_category_id,
    ch.assigned_to_user_id AS chore_assigned_to_user_id,
    ch.title AS chore_title,
    ch.frequency AS chore_frequency,
    ch.weight AS chore_weight,
    ch.priority AS chore_priority,
    ch.is_active AS chore_is_active,
    ch.created_at AS chore_created_at,
    ch.updated_at AS chore_updated_at";

pub(crate) const CATEGORY_COLUMNS: &str = "
    cat.id AS category_id,
    cat.title AS category_title,
    cat.ico AS category_ico,
    cat.active AS category_active,
    cat.created_at AS category_created_at";

pub(crate) const COMPLETION_COLUMNS: &str = "
    cc.id AS completion_id,
    cc.chore_id AS completion_chore_id,
    cc.family_id AS completion_family_id,
    cc.period_key AS completion_period_key,
    cc.completed_by_user_id AS completion_completed_by_user_id,
    cc.completed_at AS completion_completed_at";

pub(crate) fn parse_chore(row: &Row<'_>) -> RepoResult<Chore> {
    let frequency_text: String = row.get("chore_frequency")?;
    Ok(Chore {
        id: row.get("chore_id")?,
        family_id: row.get("chore_family_id")?,
        category_id: row.get("chore_category_id")?,
        assigned_to_user_id: row.get("chore_assigned_to_user_id")?,
        title: row.get("chore_title")?,
        frequency: frequency_text.parse()?,
        weight: parse_score(row, "chore_weight")?,
        priority: parse_score(row, "chore_priority")?,
        is_active: parse_flag(row, "chore_is_active")?,
        created_at: row.get("chore_created_at")?,
        updated_at: row.get("chore_updated_at")?,
    })
}

/// Returns `None` when the LEFT JOIN found no category.
pub(crate) fn parse_category(row: &Row<'_>) -> RepoResult<Option<Category>> {
    let Some(id) = row.get::<_, Option<i64>>("category_id")? else {
        return Ok(None);
    };
    Ok(Some(Category {
        id,
        title: row.get("category_title")?,
        ico: row.get("category_ico")?,
        active: parse_flag(row, "category_active")?,
        created_at: row.get("category_created_at")?,
    }))
}

pub(crate) fn parse_chore_with_category(row: &Row<'_>) -> RepoResult<ChoreWithCategory> {
    Ok(ChoreWithCategory {
        chore: parse_chore(row)?,
        category: parse_category(row)?,
    })
}

/// Returns `None` when the LEFT JOIN found no chore.
pub(crate) fn parse_optional_chore(row: &Row<'_>) -> RepoResult<Option<ChoreWithCategory>> {
    if row.get::<_, Option<i64>>("chore_id")?.is_none() {
        return Ok(None);
    }
    parse_chore_with_category(row).map(Some)
}

pub(crate) fn parse_completion(row: &Row<'_>) -> RepoResult<ChoreCompletion> {
    Ok(ChoreCompletion {
        id: row.get("completion_id")?,
        chore_id: row.get("completion_chore_id")?,
        family_id: row.get("completion_family_id")?,
        period_key: row.get("completion_period_key")?,
        completed_by_user_id: row.get("completion_completed_by_user_id")?,
        completed_at: row.get("completion_completed_at")?,
    })
}

fn parse_score(row: &Row<'_>, column: &str) -> RepoResult<u8> {
    let value: i64 = row.get(column)?;
    u8::try_from(value)
        .ok()
        .filter(|score| (1..=5).contains(score))
        .ok_or_else(|| RepoError::InvalidData(format!("invalid score `{value}` in {column}")))
}

fn parse_flag(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}
