//! Category persistence.
//!
//! Categories are referenced by chores through a plain nullable foreign key.

use super::rows::{parse_category, CATEGORY_COLUMNS};
use super::{bool_to_int, ensure_tables, RepoError, RepoResult};
use crate::model::family::Category;
use crate::model::CategoryId;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

/// Repository interface for chore categories.
pub trait CategoryRepository {
    fn create_category(
        &self,
        title: &str,
        ico: Option<&str>,
        now: NaiveDateTime,
    ) -> RepoResult<Category>;
    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>>;
    /// Lists categories ordered by title.
    fn list_categories(&self, active_only: bool) -> RepoResult<Vec<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["categories"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(
        &self,
        title: &str,
        ico: Option<&str>,
        now: NaiveDateTime,
    ) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (title, ico, active, created_at) VALUES (?1, ?2, 1, ?3);",
            params![title, ico, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_category(id)?.ok_or(RepoError::NotFound {
            entity: "category",
            id,
        })
    }

    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories cat WHERE cat.id = ?1;"
        ))?;
        let mut rows = stmt.query([category_id])?;
        match rows.next()? {
            Some(row) => parse_category(row),
            None => Ok(None),
        }
    }

    fn list_categories(&self, active_only: bool) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS}
             FROM categories cat
             WHERE (?1 = 0 OR cat.active = 1)
             ORDER BY cat.title COLLATE NOCASE ASC, cat.id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(active_only)])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            if let Some(category) = parse_category(row)? {
                categories.push(category);
            }
        }
        Ok(categories)
    }
}
