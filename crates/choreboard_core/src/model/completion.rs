//! Completion ledger records and read projections.

use super::chore::ChoreWithCategory;
use super::{ChoreId, CompletionId, FamilyId, UserId};
use chrono::NaiveDateTime;
use serde::Serialize;

/// One completion of a chore within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoreCompletion {
    pub id: CompletionId,
    pub chore_id: ChoreId,
    /// Denormalized from the chore for family-scoped reads.
    pub family_id: FamilyId,
    pub period_key: String,
    pub completed_by_user_id: UserId,
    pub completed_at: NaiveDateTime,
}

impl ChoreCompletion {
    /// Batch lookup key, `"{chore_id}|{period_key}"`.
    pub fn lookup_key(&self) -> String {
        lookup_key(self.chore_id, &self.period_key)
    }
}

pub fn lookup_key(chore_id: ChoreId, period_key: &str) -> String {
    format!("{chore_id}|{period_key}")
}

/// History entry: a completion plus the chore it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRecord {
    #[serde(flatten)]
    pub completion: ChoreCompletion,
    pub chore: Option<ChoreWithCategory>,
}

/// Optional filters for completion history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionQuery {
    pub chore_id: Option<ChoreId>,
    pub period_key: Option<String>,
    pub limit: Option<u32>,
}
