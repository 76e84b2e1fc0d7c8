//! Chore definitions and write validation.
//!
//! # Invariants
//! - `title` is trimmed, non-empty and at most `TITLE_MAX_CHARS` characters.
//! - `weight` and `priority` are within `1..=5`.
//! - `frequency` is always one of the four [`Frequency`] values once parsed.

use super::family::Category;
use super::{CategoryId, ChoreId, FamilyId, UserId};
use crate::period::Frequency;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 120;
pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 5;

/// Persisted recurring chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chore {
    pub id: ChoreId,
    pub family_id: FamilyId,
    pub category_id: Option<CategoryId>,
    pub assigned_to_user_id: Option<UserId>,
    pub title: String,
    pub frequency: Frequency,
    /// Effort weight, `1..=5`.
    pub weight: u8,
    /// Priority, `1..=5`.
    pub priority: u8,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Chore joined with its optional category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoreWithCategory {
    #[serde(flatten)]
    pub chore: Chore,
    pub category: Option<Category>,
}

/// Raw create input; every field optional so validation can report all
/// missing fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChoreDraft {
    pub title: Option<String>,
    pub frequency: Option<String>,
    pub category_id: Option<CategoryId>,
    pub weight: Option<i64>,
    pub priority: Option<i64>,
    pub is_active: Option<bool>,
    /// Marks the chore as already done for the creation-time period.
    #[serde(default)]
    pub completed_current_period: bool,
}

/// Partial update input. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChorePatch {
    pub title: Option<String>,
    pub frequency: Option<String>,
    pub category_id: Option<CategoryId>,
    pub weight: Option<i64>,
    pub priority: Option<i64>,
    pub is_active: Option<bool>,
}

/// Fully validated chore fields ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreFields {
    pub title: String,
    pub frequency: Frequency,
    pub category_id: Option<CategoryId>,
    pub weight: u8,
    pub priority: u8,
    pub is_active: bool,
}

/// Field-level validation failures, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Returns `Ok(value)` when no failures were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl ChoreDraft {
    /// Validates create input. Required: title, frequency, weight, priority.
    /// `is_active` defaults to `true`.
    pub fn validate(&self) -> Result<ChoreFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match self.title.as_deref() {
            Some(value) => check_title(value, &mut errors),
            None => {
                errors.add("title", "The title field is required.");
                None
            }
        };
        let frequency = match self.frequency.as_deref() {
            Some(value) => check_frequency(value, &mut errors),
            None => {
                errors.add("frequency", "The frequency field is required.");
                None
            }
        };
        let weight = required_score("weight", self.weight, &mut errors);
        let priority = required_score("priority", self.priority, &mut errors);

        match (title, frequency, weight, priority) {
            (Some(title), Some(frequency), Some(weight), Some(priority)) => errors.into_result(
                ChoreFields {
                    title,
                    frequency,
                    category_id: self.category_id,
                    weight,
                    priority,
                    is_active: self.is_active.unwrap_or(true),
                },
            ),
            _ => Err(errors),
        }
    }
}

impl ChorePatch {
    /// Merges this patch over `current` and validates the provided fields.
    pub fn apply_to(&self, current: &Chore) -> Result<ChoreFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match self.title.as_deref() {
            Some(value) => check_title(value, &mut errors),
            None => Some(current.title.clone()),
        };
        let frequency = match self.frequency.as_deref() {
            Some(value) => check_frequency(value, &mut errors),
            None => Some(current.frequency),
        };
        let weight = match self.weight {
            Some(value) => check_score("weight", value, &mut errors),
            None => Some(current.weight),
        };
        let priority = match self.priority {
            Some(value) => check_score("priority", value, &mut errors),
            None => Some(current.priority),
        };

        match (title, frequency, weight, priority) {
            (Some(title), Some(frequency), Some(weight), Some(priority)) => errors.into_result(
                ChoreFields {
                    title,
                    frequency,
                    category_id: self.category_id.or(current.category_id),
                    weight,
                    priority,
                    is_active: self.is_active.unwrap_or(current.is_active),
                },
            ),
            _ => Err(errors),
        }
    }
}

fn check_title(value: &str, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add("title", "The title field is required.");
        return None;
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("The title may not be greater than {TITLE_MAX_CHARS} characters."),
        );
        return None;
    }
    Some(trimmed.to_string())
}

fn check_frequency(value: &str, errors: &mut ValidationErrors) -> Option<Frequency> {
    match value.trim().parse::<Frequency>() {
        Ok(frequency) => Some(frequency),
        Err(_) => {
            errors.add(
                "frequency",
                "The frequency must be one of daily, weekly, monthly, semiannual.",
            );
            None
        }
    }
}

fn required_score(field: &str, value: Option<i64>, errors: &mut ValidationErrors) -> Option<u8> {
    match value {
        Some(value) => check_score(field, value, errors),
        None => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

fn check_score(field: &str, value: i64, errors: &mut ValidationErrors) -> Option<u8> {
    if (SCORE_MIN..=SCORE_MAX).contains(&value) {
        u8::try_from(value).ok()
    } else {
        errors.add(
            field,
            format!("The {field} must be between {SCORE_MIN} and {SCORE_MAX}."),
        );
        None
    }
}
