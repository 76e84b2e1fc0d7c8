//! Completion ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record at most one completion per (chore, period key).
//! - Serve batch and history reads for the active view.
//!
//! # Invariants
//! - Uniqueness is enforced by `uq_chore_completions_chore_period`; writes
//!   are `INSERT .. ON CONFLICT DO UPDATE`, never check-then-insert.
//! - Deletes match the exact (family, chore, period key) tuple.
//! - Writes re-check that the chore is active in the family inside their
//!   own transaction; a missing or inactive chore is `NotFound`.

use super::rows::{
    parse_completion, parse_optional_chore, CATEGORY_COLUMNS, CHORE_COLUMNS, COMPLETION_COLUMNS,
};
use super::{begin_immediate, ensure_tables, RepoError, RepoResult};
use crate::model::completion::{ChoreCompletion, CompletionQuery, CompletionRecord};
use crate::model::{ChoreId, FamilyId, UserId};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashMap;

const UPSERT_COMPLETION_SQL: &str = "
    INSERT INTO chore_completions (
        chore_id,
        family_id,
        period_key,
        completed_by_user_id,
        completed_at
    ) VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (chore_id, period_key) DO UPDATE SET
        completed_by_user_id = excluded.completed_by_user_id,
        completed_at = excluded.completed_at
    RETURNING
        id AS completion_id,
        chore_id AS completion_chore_id,
        family_id AS completion_family_id,
        period_key AS completion_period_key,
        completed_by_user_id AS completion_completed_by_user_id,
        completed_at AS completion_completed_at;";

/// Repository interface for the completion ledger.
pub trait CompletionRepository {
    /// Inserts or overwrites the completion of `chore_id` for `period_key`.
    /// Fails with `NotFound` unless the chore is active in `family_id`.
    fn upsert_completion(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        period_key: &str,
        completed_by: UserId,
        completed_at: NaiveDateTime,
    ) -> RepoResult<ChoreCompletion>;
    /// Deletes the completion for exactly this period; returns rows removed.
    /// Fails with `NotFound` unless the chore is active in `family_id`.
    fn delete_completion(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        period_key: &str,
    ) -> RepoResult<usize>;
    /// Batch lookup keyed by `"{chore_id}|{period_key}"`.
    fn completions_for(
        &self,
        family_id: FamilyId,
        chore_ids: &[ChoreId],
        period_keys: &[String],
    ) -> RepoResult<HashMap<String, ChoreCompletion>>;
    /// History newest first, with optional filters.
    fn list_completions(
        &self,
        family_id: FamilyId,
        query: &CompletionQuery,
    ) -> RepoResult<Vec<CompletionRecord>>;
}

/// SQLite-backed completion ledger.
pub struct SqliteCompletionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompletionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["chores", "chore_completions", "categories"])?;
        Ok(Self { conn })
    }
}

impl CompletionRepository for SqliteCompletionRepository<'_> {
    fn upsert_completion(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        period_key: &str,
        completed_by: UserId,
        completed_at: NaiveDateTime,
    ) -> RepoResult<ChoreCompletion> {
        let tx = begin_immediate(self.conn)?;
        require_active_chore_in(&tx, chore_id, family_id)?;
        let completion =
            upsert_completion_in(&tx, chore_id, family_id, period_key, completed_by, completed_at)?;
        tx.commit()?;
        Ok(completion)
    }

    fn delete_completion(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        period_key: &str,
    ) -> RepoResult<usize> {
        let tx = begin_immediate(self.conn)?;
        require_active_chore_in(&tx, chore_id, family_id)?;
        let removed = tx.execute(
            "DELETE FROM chore_completions
             WHERE family_id = ?1
               AND chore_id = ?2
               AND period_key = ?3;",
            params![family_id, chore_id, period_key],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    fn completions_for(
        &self,
        family_id: FamilyId,
        chore_ids: &[ChoreId],
        period_keys: &[String],
    ) -> RepoResult<HashMap<String, ChoreCompletion>> {
        if chore_ids.is_empty() || period_keys.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COMPLETION_COLUMNS}
             FROM chore_completions cc
             WHERE cc.family_id = ?
               AND cc.chore_id IN ({})
               AND cc.period_key IN ({});",
            placeholders(chore_ids.len()),
            placeholders(period_keys.len())
        );
        let mut bind_values: Vec<Value> = Vec::with_capacity(1 + chore_ids.len() + period_keys.len());
        bind_values.push(Value::Integer(family_id));
        bind_values.extend(chore_ids.iter().map(|id| Value::Integer(*id)));
        bind_values.extend(period_keys.iter().map(|key| Value::Text(key.clone())));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut found = HashMap::new();
        while let Some(row) = rows.next()? {
            let completion = parse_completion(row)?;
            found.insert(completion.lookup_key(), completion);
        }

        Ok(found)
    }

    fn list_completions(
        &self,
        family_id: FamilyId,
        query: &CompletionQuery,
    ) -> RepoResult<Vec<CompletionRecord>> {
        let mut sql = format!(
            "SELECT {COMPLETION_COLUMNS}, {CHORE_COLUMNS}, {CATEGORY_COLUMNS}
             FROM chore_completions cc
             LEFT JOIN chores ch ON ch.id = cc.chore_id
             LEFT JOIN categories cat ON cat.id = ch.category_id
             WHERE cc.family_id = ?"
        );
        let mut bind_values: Vec<Value> = vec![Value::Integer(family_id)];

        if let Some(chore_id) = query.chore_id {
            sql.push_str(" AND cc.chore_id = ?");
            bind_values.push(Value::Integer(chore_id));
        }

        if let Some(period_key) = query.period_key.as_ref() {
            sql.push_str(" AND cc.period_key = ?");
            bind_values.push(Value::Text(period_key.clone()));
        }

        sql.push_str(" ORDER BY cc.completed_at DESC, cc.id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(CompletionRecord {
                completion: parse_completion(row)?,
                chore: parse_optional_chore(row)?,
            });
        }

        Ok(records)
    }
}

/// Upserts inside a caller-owned transaction.
pub(crate) fn upsert_completion_in(
    conn: &Connection,
    chore_id: ChoreId,
    family_id: FamilyId,
    period_key: &str,
    completed_by: UserId,
    completed_at: NaiveDateTime,
) -> RepoResult<ChoreCompletion> {
    let mut stmt = conn.prepare(UPSERT_COMPLETION_SQL)?;
    let mut rows = stmt.query(params![
        chore_id,
        family_id,
        period_key,
        completed_by,
        completed_at
    ])?;
    match rows.next()? {
        Some(row) => parse_completion(row),
        None => Err(rusqlite::Error::QueryReturnedNoRows.into()),
    }
}

fn require_active_chore_in(
    conn: &Connection,
    chore_id: ChoreId,
    family_id: FamilyId,
) -> RepoResult<()> {
    let active: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM chores
            WHERE id = ?1 AND family_id = ?2 AND is_active = 1
        );",
        params![chore_id, family_id],
        |row| row.get(0),
    )?;
    if active != 1 {
        return Err(RepoError::NotFound {
            entity: "chore",
            id: chore_id,
        });
    }
    Ok(())
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
