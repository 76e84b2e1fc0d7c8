//! Period key parsing.

use super::range::{period_range, PeriodRange};
use super::{Frequency, PeriodError, PeriodResult};
use chrono::{NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{Display, Formatter};

static DAILY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid daily key regex")
});
static WEEKLY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-W([0-9]{2})$").expect("valid weekly key regex"));
static MONTHLY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").expect("valid monthly key regex"));
static SEMIANNUAL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-H([12])$").expect("valid semiannual key regex"));

/// A validated period key together with the frequency its format implies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PeriodKey {
    frequency: Frequency,
    value: String,
    #[serde(skip)]
    start: NaiveDate,
}

impl PeriodKey {
    /// Parses one of `YYYY-MM-DD`, `YYYY-Www`, `YYYY-MM`, `YYYY-H1|H2`.
    ///
    /// Keys naming a non-existent day or week (e.g. `2025-02-30`,
    /// `2025-W53`) are rejected.
    pub fn parse(value: &str) -> PeriodResult<Self> {
        let trimmed = value.trim();
        let invalid = || PeriodError::InvalidKey(value.to_string());

        let (frequency, start) = if let Some(caps) = DAILY_KEY_RE.captures(trimmed) {
            let date = NaiveDate::from_ymd_opt(
                number(&caps[1]),
                number(&caps[2]),
                number(&caps[3]),
            );
            (Frequency::Daily, date)
        } else if let Some(caps) = WEEKLY_KEY_RE.captures(trimmed) {
            let date = NaiveDate::from_isoywd_opt(number(&caps[1]), number(&caps[2]), Weekday::Mon);
            (Frequency::Weekly, date)
        } else if let Some(caps) = MONTHLY_KEY_RE.captures(trimmed) {
            let date = NaiveDate::from_ymd_opt(number(&caps[1]), number(&caps[2]), 1);
            (Frequency::Monthly, date)
        } else if let Some(caps) = SEMIANNUAL_KEY_RE.captures(trimmed) {
            let month = if &caps[2] == "1" { 1 } else { 7 };
            let date = NaiveDate::from_ymd_opt(number(&caps[1]), month, 1);
            (Frequency::Semiannual, date)
        } else {
            return Err(invalid());
        };

        let start = start.ok_or_else(invalid)?;
        Ok(Self {
            frequency,
            value: trimmed.to_string(),
            start,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the full window this key names.
    pub fn range(&self) -> PeriodResult<PeriodRange> {
        period_range(self.frequency, self.start.and_time(NaiveTime::MIN))
    }
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

// Captures are ASCII digits bounded by the regexes, so parsing cannot fail;
// zero falls through to the calendar validation above.
fn number<T: std::str::FromStr + Default>(digits: &str) -> T {
    digits.parse().unwrap_or_default()
}
