//! Chore registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist chore definitions scoped to one family.
//! - Own the atomic chore + completions delete.
//!
//! # Invariants
//! - Lookups by id always carry `family_id`; rows of other families are
//!   indistinguishable from missing rows.
//! - Deleting a chore removes its completions in the same transaction.

use super::completion_repo::upsert_completion_in;
use super::rows::{parse_chore_with_category, CATEGORY_COLUMNS, CHORE_COLUMNS};
use super::{begin_immediate, bool_to_int, ensure_tables, RepoError, RepoResult};
use crate::model::chore::{ChoreFields, ChoreWithCategory};
use crate::model::{CategoryId, ChoreId, FamilyId, UserId};
use crate::period::Frequency;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Optional list filters; unset fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoreFilter {
    pub active: Option<bool>,
    pub category_id: Option<CategoryId>,
    pub frequency: Option<Frequency>,
}

/// Insert payload for a new chore.
#[derive(Debug, Clone)]
pub struct NewChoreRecord<'a> {
    pub family_id: FamilyId,
    pub assigned_to_user_id: Option<UserId>,
    pub fields: &'a ChoreFields,
    /// When set, a completion for this period is upserted in the same
    /// transaction, attributed to `assigned_to_user_id`.
    pub completed_period_key: Option<&'a str>,
    pub now: NaiveDateTime,
}

/// Repository interface for chore definitions.
pub trait ChoreRepository {
    fn create_chore(&self, record: &NewChoreRecord<'_>) -> RepoResult<ChoreId>;
    fn update_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        fields: &ChoreFields,
        now: NaiveDateTime,
    ) -> RepoResult<()>;
    fn get_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
    ) -> RepoResult<Option<ChoreWithCategory>>;
    fn list_chores(
        &self,
        family_id: FamilyId,
        filter: &ChoreFilter,
    ) -> RepoResult<Vec<ChoreWithCategory>>;
    /// Active chores ordered by priority DESC, weight DESC, title ASC.
    fn list_active_chores(&self, family_id: FamilyId) -> RepoResult<Vec<ChoreWithCategory>>;
    /// Deletes a chore and all its completions; returns the number of
    /// completions removed.
    fn delete_chore(&self, chore_id: ChoreId, family_id: FamilyId) -> RepoResult<usize>;
}

/// SQLite-backed chore repository.
pub struct SqliteChoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChoreRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["chores", "chore_completions", "categories"])?;
        Ok(Self { conn })
    }

    fn select_sql() -> String {
        format!(
            "SELECT {CHORE_COLUMNS}, {CATEGORY_COLUMNS}
             FROM chores ch
             LEFT JOIN categories cat ON cat.id = ch.category_id"
        )
    }
}

impl ChoreRepository for SqliteChoreRepository<'_> {
    fn create_chore(&self, record: &NewChoreRecord<'_>) -> RepoResult<ChoreId> {
        let fields = record.fields;
        let tx = begin_immediate(self.conn)?;
        tx.execute(
            "INSERT INTO chores (
                family_id,
                category_id,
                assigned_to_user_id,
                title,
                frequency,
                weight,
                priority,
                is_active,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
            params![
                record.family_id,
                fields.category_id,
                record.assigned_to_user_id,
                fields.title.as_str(),
                fields.frequency.as_str(),
                fields.weight,
                fields.priority,
                bool_to_int(fields.is_active),
                record.now,
            ],
        )?;
        let chore_id = tx.last_insert_rowid();

        if let Some(period_key) = record.completed_period_key {
            let completed_by = record.assigned_to_user_id.ok_or_else(|| {
                RepoError::InvalidData(
                    "pre-completed chore requires a completing user".to_string(),
                )
            })?;
            upsert_completion_in(
                &tx,
                chore_id,
                record.family_id,
                period_key,
                completed_by,
                record.now,
            )?;
        }

        tx.commit()?;
        Ok(chore_id)
    }

    fn update_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
        fields: &ChoreFields,
        now: NaiveDateTime,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE chores
             SET
                title = ?3,
                frequency = ?4,
                category_id = ?5,
                weight = ?6,
                priority = ?7,
                is_active = ?8,
                updated_at = ?9
             WHERE id = ?1
               AND family_id = ?2;",
            params![
                chore_id,
                family_id,
                fields.title.as_str(),
                fields.frequency.as_str(),
                fields.category_id,
                fields.weight,
                fields.priority,
                bool_to_int(fields.is_active),
                now,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "chore",
                id: chore_id,
            });
        }

        Ok(())
    }

    fn get_chore(
        &self,
        chore_id: ChoreId,
        family_id: FamilyId,
    ) -> RepoResult<Option<ChoreWithCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{}
             WHERE ch.id = ?1
               AND ch.family_id = ?2;",
            Self::select_sql()
        ))?;

        let mut rows = stmt.query(params![chore_id, family_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_chore_with_category(row)?));
        }

        Ok(None)
    }

    fn list_chores(
        &self,
        family_id: FamilyId,
        filter: &ChoreFilter,
    ) -> RepoResult<Vec<ChoreWithCategory>> {
        let mut sql = format!("{} WHERE ch.family_id = ?", Self::select_sql());
        let mut bind_values: Vec<Value> = vec![Value::Integer(family_id)];

        if let Some(active) = filter.active {
            sql.push_str(" AND ch.is_active = ?");
            bind_values.push(Value::Integer(bool_to_int(active)));
        }

        if let Some(category_id) = filter.category_id {
            sql.push_str(" AND ch.category_id = ?");
            bind_values.push(Value::Integer(category_id));
        }

        if let Some(frequency) = filter.frequency {
            sql.push_str(" AND ch.frequency = ?");
            bind_values.push(Value::Text(frequency.as_str().to_string()));
        }

        sql.push_str(" ORDER BY ch.is_active DESC, ch.title ASC, ch.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut chores = Vec::new();
        while let Some(row) = rows.next()? {
            chores.push(parse_chore_with_category(row)?);
        }

        Ok(chores)
    }

    fn list_active_chores(&self, family_id: FamilyId) -> RepoResult<Vec<ChoreWithCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{}
             WHERE ch.family_id = ?1
               AND ch.is_active = 1
             ORDER BY ch.priority DESC, ch.weight DESC, ch.title ASC, ch.id ASC;",
            Self::select_sql()
        ))?;

        let mut rows = stmt.query([family_id])?;
        let mut chores = Vec::new();
        while let Some(row) = rows.next()? {
            chores.push(parse_chore_with_category(row)?);
        }

        Ok(chores)
    }

    fn delete_chore(&self, chore_id: ChoreId, family_id: FamilyId) -> RepoResult<usize> {
        let tx = begin_immediate(self.conn)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM chores
                WHERE id = ?1 AND family_id = ?2
            );",
            params![chore_id, family_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound {
                entity: "chore",
                id: chore_id,
            });
        }

        let removed = tx.execute(
            "DELETE FROM chore_completions WHERE chore_id = ?1;",
            [chore_id],
        )?;
        tx.execute(
            "DELETE FROM chores WHERE id = ?1 AND family_id = ?2;",
            params![chore_id, family_id],
        )?;
        tx.commit()?;

        Ok(removed)
    }
}
