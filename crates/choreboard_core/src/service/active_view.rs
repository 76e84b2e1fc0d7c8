//! "What is pending now" projection.
//!
//! # Invariants
//! - A chore is pending iff no completion exists for its current period key;
//!   rollover needs no background job because a later `now` yields a new key.
//! - Completions are fetched with one batch query, not one per chore.
//! - The recent feed is independent of the pending partition.

use super::chore_service::ServiceResult;
use crate::model::chore::{Chore, ChoreWithCategory};
use crate::model::completion::{lookup_key, CompletionQuery, CompletionRecord};
use crate::model::family::Category;
use crate::model::{FamilyId, UserId};
use crate::period::period_range;
use crate::repo::chore_repo::ChoreRepository;
use crate::repo::completion_repo::CompletionRepository;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;

/// Size of the short history feed.
pub const RECENT_COMPLETIONS_LIMIT: u32 = 3;

/// One chore with its current-period state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoreStatus {
    #[serde(flatten)]
    pub chore: Chore,
    pub category: Option<Category>,
    pub period_key: String,
    /// End (exclusive) of the current period.
    pub due_at: NaiveDateTime,
    pub is_completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by_user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveView {
    /// Active chores not yet completed this period, ordered by priority
    /// DESC, weight DESC, title ASC.
    pub pending: Vec<ChoreStatus>,
    /// Latest completions of the family across all chores and periods.
    pub recently_completed: Vec<CompletionRecord>,
}

/// Builds the active view for `family_id` as of `now`.
pub fn build_active_view<C, L>(
    chores: &C,
    ledger: &L,
    family_id: FamilyId,
    now: NaiveDateTime,
) -> ServiceResult<ActiveView>
where
    C: ChoreRepository,
    L: CompletionRepository,
{
    let active = chores.list_active_chores(family_id)?;

    let mut periods = Vec::with_capacity(active.len());
    for entry in &active {
        periods.push(period_range(entry.chore.frequency, now)?);
    }

    let chore_ids: Vec<_> = active.iter().map(|entry| entry.chore.id).collect();
    let period_keys: Vec<String> = periods
        .iter()
        .map(|period| period.key.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let done = ledger.completions_for(family_id, &chore_ids, &period_keys)?;

    let pending = active
        .into_iter()
        .zip(periods)
        .filter(|(entry, period)| !done.contains_key(&lookup_key(entry.chore.id, &period.key)))
        .map(|(ChoreWithCategory { chore, category }, period)| ChoreStatus {
            chore,
            category,
            period_key: period.key,
            due_at: period.end_exclusive,
            is_completed: false,
            completed_at: None,
            completed_by_user_id: None,
        })
        .collect();

    let recently_completed = ledger.list_completions(
        family_id,
        &CompletionQuery {
            limit: Some(RECENT_COMPLETIONS_LIMIT),
            ..CompletionQuery::default()
        },
    )?;

    Ok(ActiveView {
        pending,
        recently_completed,
    })
}
