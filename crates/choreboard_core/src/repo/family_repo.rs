//! Family and membership persistence.
//!
//! Family management flows live outside this crate; this repository only
//! resolves a user's current family and creates families with their owner.
//!
//! # Invariants
//! - A user has at most one membership with `current = 1`.

use super::{begin_immediate, bool_to_int, ensure_tables, RepoError, RepoResult};
use crate::model::family::{slugify, Family};
use crate::model::{FamilyId, UserId};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

const FAMILY_SELECT_SQL: &str = "SELECT
    f.id,
    f.name,
    f.code,
    f.created_at
FROM families f";

/// Repository interface for families and memberships.
pub trait FamilyRepository {
    /// Creates a family with `owner` as member in one transaction. The
    /// membership is current only when it is the owner's first; the returned
    /// flag reports which.
    fn create_family(
        &self,
        owner: UserId,
        name: &str,
        now: NaiveDateTime,
    ) -> RepoResult<(Family, bool)>;
    /// Moves the user's current flag to `family_id`.
    fn set_current_family(&self, user_id: UserId, family_id: FamilyId) -> RepoResult<()>;
    fn current_family(&self, user_id: UserId) -> RepoResult<Option<Family>>;
}

/// SQLite-backed family repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["families", "users_families"])?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn create_family(
        &self,
        owner: UserId,
        name: &str,
        now: NaiveDateTime,
    ) -> RepoResult<(Family, bool)> {
        let name = name.trim();
        let code = slugify(name);
        let tx = begin_immediate(self.conn)?;
        let memberships: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users_families WHERE user_id = ?1;",
            [owner],
            |row| row.get(0),
        )?;
        let current = memberships == 0;
        tx.execute(
            "INSERT INTO families (name, code, created_at) VALUES (?1, ?2, ?3);",
            params![name, code.as_str(), now],
        )?;
        let family_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO users_families (user_id, family_id, current) VALUES (?1, ?2, ?3);",
            params![owner, family_id, bool_to_int(current)],
        )?;
        tx.commit()?;

        Ok((
            Family {
                id: family_id,
                name: name.to_string(),
                code,
                created_at: now,
            },
            current,
        ))
    }

    fn set_current_family(&self, user_id: UserId, family_id: FamilyId) -> RepoResult<()> {
        let tx = begin_immediate(self.conn)?;
        tx.execute(
            "UPDATE users_families SET current = 0 WHERE user_id = ?1;",
            [user_id],
        )?;
        let changed = tx.execute(
            "UPDATE users_families
             SET current = 1
             WHERE user_id = ?1 AND family_id = ?2;",
            params![user_id, family_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "family membership",
                id: family_id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn current_family(&self, user_id: UserId) -> RepoResult<Option<Family>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FAMILY_SELECT_SQL}
             INNER JOIN users_families uf ON uf.family_id = f.id
             WHERE uf.user_id = ?1
               AND uf.current = 1
             ORDER BY f.id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_family_row(row)?));
        }
        Ok(None)
    }
}

impl SqliteFamilyRepository<'_> {
    #[allow(dead_code)]
    fn count_memberships(&self, user_id: UserId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM users_families WHERE user_id = ?1;",
            [user_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }
}

fn parse_family_row(row: &Row<'_>) -> RepoResult<Family> {
    Ok(Family {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        created_at: row.get("created_at")?,
    })
}
