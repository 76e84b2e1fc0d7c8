//! Domain model for families, chores and their completions.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and the HTTP
//!   surface.
//! - Own input validation for chore writes.
//!
//! # Invariants
//! - A chore and its completions belong to exactly one family.
//! - Chore weight and priority are within `1..=5`.
//! - At most one completion exists per (chore, period key).

pub mod chore;
pub mod completion;
pub mod family;

/// Integer primary keys, mirrored from SQLite `INTEGER PRIMARY KEY` columns.
pub type ChoreId = i64;
pub type CompletionId = i64;
pub type FamilyId = i64;
pub type CategoryId = i64;
/// Opaque user id issued by the external identity provider.
pub type UserId = i64;
