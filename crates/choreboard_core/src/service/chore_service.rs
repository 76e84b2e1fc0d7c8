//! Chore registry and completion ledger use-cases.
//!
//! # Responsibility
//! - Validate and persist chore definitions.
//! - Mark chores complete/incomplete for their current period.
//! - Serve completion history.
//!
//! # Invariants
//! - Chores of another family and inactive chores are reported as
//!   `NotFound`, never as forbidden.
//! - `uncomplete` only ever touches the current period's completion.
//! - Service layer remains storage-agnostic.

use crate::model::chore::{ChoreDraft, ChorePatch, ChoreWithCategory, ValidationErrors};
use crate::model::completion::{ChoreCompletion, CompletionQuery, CompletionRecord};
use crate::model::family::Category;
use crate::model::{CategoryId, ChoreId, FamilyId, UserId};
use crate::period::{period_range, PeriodError, PeriodKey};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::chore_repo::{
    ChoreFilter, ChoreRepository, NewChoreRecord, SqliteChoreRepository,
};
use crate::repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::active_view::{build_active_view, ActiveView};
use chrono::NaiveDateTime;
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;
use thiserror::Error;

/// Service error for chore and completion use-cases.
#[derive(Debug, Error)]
pub enum ChoreServiceError {
    /// Missing, owned by another family, or (for completion) inactive.
    #[error("chore not found: {0}")]
    NotFound(ChoreId),
    #[error("user {0} has no current family selected")]
    NoCurrentFamily(UserId),
    #[error(transparent)]
    Validation(ValidationErrors),
    /// A stored frequency is not computable; a data error, not a user error.
    #[error(transparent)]
    Period(PeriodError),
    #[error(transparent)]
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    #[error("inconsistent chore state: {0}")]
    InconsistentState(&'static str),
}

impl From<RepoError> for ChoreServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "chore",
                id,
            } => Self::NotFound(id),
            RepoError::Period(err) => Self::Period(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PeriodError> for ChoreServiceError {
    fn from(value: PeriodError) -> Self {
        Self::Period(value)
    }
}

impl From<ValidationErrors> for ChoreServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, ChoreServiceError>;

/// Chore + ledger service facade over repository implementations.
pub struct ChoreService<C, L, K>
where
    C: ChoreRepository,
    L: CompletionRepository,
    K: CategoryRepository,
{
    chores: C,
    ledger: L,
    categories: K,
}

/// Service wired to one SQLite connection.
pub type SqliteChoreService<'conn> = ChoreService<
    SqliteChoreRepository<'conn>,
    SqliteCompletionRepository<'conn>,
    SqliteCategoryRepository<'conn>,
>;

impl<'conn> SqliteChoreService<'conn> {
    /// Builds all repositories over one migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(ChoreService::new(
            SqliteChoreRepository::try_new(conn)?,
            SqliteCompletionRepository::try_new(conn)?,
            SqliteCategoryRepository::try_new(conn)?,
        ))
    }
}

impl<C, L, K> ChoreService<C, L, K>
where
    C: ChoreRepository,
    L: CompletionRepository,
    K: CategoryRepository,
{
    pub fn new(chores: C, ledger: L, categories: K) -> Self {
        Self {
            chores,
            ledger,
            categories,
        }
    }

    /// Creates a chore assigned to `user_id`.
    ///
    /// With `completed_current_period`, the creation-time period is recorded
    /// as completed by `user_id` in the same transaction.
    pub fn create_chore(
        &self,
        family_id: FamilyId,
        user_id: UserId,
        draft: &ChoreDraft,
        now: NaiveDateTime,
    ) -> ServiceResult<ChoreWithCategory> {
        let fields = draft.validate()?;
        let mut errors = ValidationErrors::new();
        self.check_category(fields.category_id, &mut errors)?;
        errors.into_result(())?;

        let completed_period_key = if draft.completed_current_period {
            Some(period_range(fields.frequency, now)?.key)
        } else {
            None
        };

        let chore_id = self.chores.create_chore(&NewChoreRecord {
            family_id,
            assigned_to_user_id: Some(user_id),
            fields: &fields,
            completed_period_key: completed_period_key.as_deref(),
            now,
        })?;
        info!(
            "event=chore_create module=service status=ok chore_id={} family_id={} precompleted={}",
            chore_id,
            family_id,
            completed_period_key.is_some()
        );

        self.chores
            .get_chore(chore_id, family_id)?
            .ok_or(ChoreServiceError::InconsistentState(
                "created chore not found in read-back",
            ))
    }

    /// Applies a partial update.
    pub fn update_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        patch: &ChorePatch,
        now: NaiveDateTime,
    ) -> ServiceResult<ChoreWithCategory> {
        let current = self.require_chore(chore_id, family_id)?;
        let fields = patch.apply_to(&current.chore)?;
        if patch.category_id.is_some() {
            let mut errors = ValidationErrors::new();
            self.check_category(fields.category_id, &mut errors)?;
            errors.into_result(())?;
        }

        self.chores.update_chore(chore_id, family_id, &fields, now)?;
        info!(
            "event=chore_update module=service status=ok chore_id={} family_id={}",
            chore_id, family_id
        );

        self.chores
            .get_chore(chore_id, family_id)?
            .ok_or(ChoreServiceError::InconsistentState(
                "updated chore not found in read-back",
            ))
    }

    /// Deletes a chore with all its completions, atomically.
    pub fn delete_chore(&self, chore_id: ChoreId, family_id: FamilyId) -> ServiceResult<usize> {
        let removed = self.chores.delete_chore(chore_id, family_id)?;
        info!(
            "event=chore_delete module=service status=ok chore_id={} family_id={} completions_removed={}",
            chore_id, family_id, removed
        );
        Ok(removed)
    }

    pub fn get_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
    ) -> ServiceResult<ChoreWithCategory> {
        self.require_chore(chore_id, family_id)
    }

    pub fn list_chores(
        &self,
        family_id: FamilyId,
        filter: &ChoreFilter,
    ) -> ServiceResult<Vec<ChoreWithCategory>> {
        Ok(self.chores.list_chores(family_id, filter)?)
    }

    /// Records `user_id` as completer of the chore's current period.
    ///
    /// A second call in the same period overwrites completer and timestamp.
    pub fn complete(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        user_id: UserId,
        now: NaiveDateTime,
    ) -> ServiceResult<CompletionRecord> {
        let chore = self.require_active_chore(chore_id, family_id)?;
        let period = period_range(chore.chore.frequency, now)?;
        let completion =
            self.ledger
                .upsert_completion(chore_id, family_id, &period.key, user_id, now)?;
        info!(
            "event=chore_complete module=service status=ok chore_id={} family_id={} period_key={}",
            chore_id, family_id, period.key
        );

        Ok(CompletionRecord {
            completion,
            chore: Some(chore),
        })
    }

    /// Clears the completion of the chore's current period and returns the
    /// period key that was targeted. Past periods are never touched.
    pub fn uncomplete(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        now: NaiveDateTime,
    ) -> ServiceResult<String> {
        let chore = self.require_active_chore(chore_id, family_id)?;
        let period = period_range(chore.chore.frequency, now)?;
        let removed = self
            .ledger
            .delete_completion(chore_id, family_id, &period.key)?;
        info!(
            "event=chore_uncomplete module=service status=ok chore_id={} family_id={} period_key={} removed={}",
            chore_id, family_id, period.key, removed
        );
        Ok(period.key)
    }

    /// Batch lookup keyed by `"{chore_id}|{period_key}"`.
    pub fn completions_for(
        &self,
        family_id: FamilyId,
        chore_ids: &[ChoreId],
        period_keys: &[String],
    ) -> ServiceResult<HashMap<String, ChoreCompletion>> {
        Ok(self
            .ledger
            .completions_for(family_id, chore_ids, period_keys)?)
    }

    /// Completion history, newest first.
    pub fn completion_history(
        &self,
        family_id: FamilyId,
        query: &CompletionQuery,
    ) -> ServiceResult<Vec<CompletionRecord>> {
        let period_key = match query.period_key.as_deref() {
            Some(key) => match PeriodKey::parse(key) {
                Ok(parsed) => Some(parsed.as_str().to_string()),
                Err(_) => {
                    let mut errors = ValidationErrors::new();
                    errors.add("period_key", "The period key format is invalid.");
                    return Err(errors.into());
                }
            },
            None => None,
        };
        let query = CompletionQuery {
            period_key,
            ..query.clone()
        };
        Ok(self.ledger.list_completions(family_id, &query)?)
    }

    /// Latest `limit` completions of the family across chores and periods.
    pub fn recent_completions(
        &self,
        family_id: FamilyId,
        limit: u32,
    ) -> ServiceResult<Vec<CompletionRecord>> {
        Ok(self.ledger.list_completions(
            family_id,
            &CompletionQuery {
                limit: Some(limit),
                ..CompletionQuery::default()
            },
        )?)
    }

    /// Pending chores for `now` plus the short history feed.
    pub fn active_view(&self, family_id: FamilyId, now: NaiveDateTime) -> ServiceResult<ActiveView> {
        build_active_view(&self.chores, &self.ledger, family_id, now)
    }

    pub fn list_categories(&self, active_only: bool) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list_categories(active_only)?)
    }

    pub fn create_category(
        &self,
        title: Option<&str>,
        ico: Option<&str>,
        now: NaiveDateTime,
    ) -> ServiceResult<Category> {
        let title = title.map(str::trim).unwrap_or_default();
        if title.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("title", "The title field is required.");
            return Err(errors.into());
        }
        let ico = ico.map(str::trim).filter(|value| !value.is_empty());
        Ok(self.categories.create_category(title, ico, now)?)
    }

    fn require_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
    ) -> ServiceResult<ChoreWithCategory> {
        self.chores
            .get_chore(chore_id, family_id)?
            .ok_or(ChoreServiceError::NotFound(chore_id))
    }

    fn require_active_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
    ) -> ServiceResult<ChoreWithCategory> {
        let chore = self.require_chore(chore_id, family_id)?;
        if !chore.chore.is_active {
            return Err(ChoreServiceError::NotFound(chore_id));
        }
        Ok(chore)
    }

    fn check_category(
        &self,
        category_id: Option<CategoryId>,
        errors: &mut ValidationErrors,
    ) -> ServiceResult<()> {
        if let Some(category_id) = category_id {
            if self.categories.get_category(category_id)?.is_none() {
                errors.add("category_id", "The selected category is invalid.");
            }
        }
        Ok(())
    }
}
