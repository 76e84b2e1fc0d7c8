//! Core domain logic for Choreboard.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod period;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::chore::{
    Chore, ChoreDraft, ChoreFields, ChorePatch, ChoreWithCategory, ValidationErrors,
};
pub use model::completion::{ChoreCompletion, CompletionQuery, CompletionRecord};
pub use model::family::{Category, Family};
pub use model::{CategoryId, ChoreId, CompletionId, FamilyId, UserId};
pub use period::{
    period_key, period_range, period_range_for, Frequency, PeriodError, PeriodKey, PeriodRange,
};
pub use repo::chore_repo::ChoreFilter;
pub use repo::{RepoError, RepoResult};
pub use service::active_view::{ActiveView, ChoreStatus};
pub use service::chore_service::{
    ChoreService, ChoreServiceError, ServiceResult, SqliteChoreService,
};
pub use service::family_service::FamilyService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
