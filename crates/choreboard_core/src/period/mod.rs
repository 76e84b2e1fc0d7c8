//! Recurrence periods for chores.
//!
//! # Responsibility
//! - Map a (frequency, instant) pair to its canonical period key and
//!   half-open `[start, end_exclusive)` window.
//! - Parse persisted or user-supplied period keys back into windows.
//!
//! # Invariants
//! - All instants are local wall-clock times of one deployment clock.
//! - For every frequency and instant `t`: `start <= t < end_exclusive`.
//! - The period key is the natural key of a completion; two instants share a
//!   key iff they share a window.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

mod key;
mod range;

pub use key::PeriodKey;
pub use range::{period_key, period_range, period_range_for, PeriodRange};

pub type PeriodResult<T> = Result<T, PeriodError>;

/// Errors raised by period computation and key parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Frequency text is not one of `daily|weekly|monthly|semiannual`.
    #[error("invalid frequency: `{0}`")]
    InvalidFrequency(String),
    /// Window boundary falls outside the representable calendar.
    #[error("period boundary out of range for instant {0}")]
    OutOfRange(NaiveDateTime),
    /// Text does not match any period key format.
    #[error("invalid period key: `{0}`")]
    InvalidKey(String),
}

/// Recurrence frequency of a chore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Semiannual,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Semiannual,
    ];

    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Semiannual => "semiannual",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = PeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "semiannual" => Ok(Self::Semiannual),
            other => Err(PeriodError::InvalidFrequency(other.to_string())),
        }
    }
}
