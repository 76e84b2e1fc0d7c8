//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every chore/completion query is scoped by `family_id`.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.

use crate::db::DbError;
use crate::period::PeriodError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

pub mod category_repo;
pub mod chore_repo;
pub mod completion_repo;
pub mod family_repo;
mod rows;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error("required table `{0}` is missing; was the connection migrated?")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Starts a write transaction on a shared connection reference.
///
/// `IMMEDIATE` takes the write lock at `BEGIN`; writers on other connections
/// wait on the busy timeout.
pub(crate) fn begin_immediate(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
