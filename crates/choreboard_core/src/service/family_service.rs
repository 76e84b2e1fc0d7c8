//! Current-family resolution.
//!
//! The "current family" is a per-membership flag owned by the external
//! membership subsystem. It is resolved once at the edge and passed to every
//! other service call as an explicit `family_id`.

use super::chore_service::{ChoreServiceError, ServiceResult};
use crate::model::chore::ValidationErrors;
use crate::model::family::Family;
use crate::model::{FamilyId, UserId};
use crate::repo::family_repo::FamilyRepository;
use chrono::NaiveDateTime;
use log::info;

const FAMILY_NAME_MIN_CHARS: usize = 3;
const FAMILY_NAME_MAX_CHARS: usize = 50;

pub struct FamilyService<R: FamilyRepository> {
    repo: R,
}

impl<R: FamilyRepository> FamilyService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the user's current family or `NoCurrentFamily`.
    pub fn current_family_or_fail(&self, user_id: UserId) -> ServiceResult<Family> {
        self.repo
            .current_family(user_id)?
            .ok_or(ChoreServiceError::NoCurrentFamily(user_id))
    }

    /// Creates a family and joins `user_id` to it. The membership becomes
    /// current only when it is the user's first.
    pub fn create_family(
        &self,
        user_id: UserId,
        name: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<Family> {
        let length = name.trim().chars().count();
        if !(FAMILY_NAME_MIN_CHARS..=FAMILY_NAME_MAX_CHARS).contains(&length) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "name",
                format!(
                    "The name must be between {FAMILY_NAME_MIN_CHARS} and {FAMILY_NAME_MAX_CHARS} characters."
                ),
            );
            return Err(errors.into());
        }

        let (family, current) = self.repo.create_family(user_id, name, now)?;
        info!(
            "event=family_create module=service status=ok family_id={} current={}",
            family.id, current
        );
        Ok(family)
    }

    pub fn set_current_family(&self, user_id: UserId, family_id: FamilyId) -> ServiceResult<()> {
        Ok(self.repo.set_current_family(user_id, family_id)?)
    }
}
