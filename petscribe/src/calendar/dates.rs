//! Date arithmetic for ages and recurring care events
//!
//! Both calculations are deliberately coarse: age ignores the day of month
//! and a month of frequency is always 30 days. Stored data and reminder
//! dates depend on these exact results.

use crate::config::{DAYS_PER_MONTH, DAYS_PER_WEEK};
use crate::error::{AppError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Elapsed whole years plus remainder months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Age {
    pub years: i32,
    pub months: u32,
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_suffix = if self.years == 1 { "" } else { "s" };
        let month_suffix = if self.months == 1 { "" } else { "s" };
        write!(
            f,
            "{} year{} {} month{}",
            self.years, year_suffix, self.months, month_suffix
        )
    }
}

/// Compute age from a birth date, comparing only year and month.
pub fn age_from(birth: NaiveDate, now: NaiveDate) -> Age {
    let mut years = now.year() - birth.year();
    let mut months = now.month() as i32 - birth.month() as i32;

    if months < 0 {
        years -= 1;
        months += 12;
    }

    Age {
        years,
        months: months as u32,
    }
}

/// Unit of a care frequency ("every 2 weeks")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Days,
    Weeks,
    Months,
}

impl FrequencyUnit {
    /// Number of days one unit stands for
    pub fn days(self) -> u64 {
        match self {
            FrequencyUnit::Days => 1,
            FrequencyUnit::Weeks => DAYS_PER_WEEK,
            FrequencyUnit::Months => DAYS_PER_MONTH,
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrequencyUnit::Days => "days",
            FrequencyUnit::Weeks => "weeks",
            FrequencyUnit::Months => "months",
        };
        f.write_str(s)
    }
}

impl FromStr for FrequencyUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(FrequencyUnit::Days),
            "week" | "weeks" => Ok(FrequencyUnit::Weeks),
            "month" | "months" => Ok(FrequencyUnit::Months),
            other => Err(AppError::Validation(format!(
                "Invalid frequency unit '{}'. Use days, weeks or months",
                other
            ))),
        }
    }
}

/// A count plus unit, stored as the "N unit" string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub count: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub fn new(count: u32, unit: FrequencyUnit) -> Result<Self> {
        if count == 0 {
            return Err(AppError::Validation(
                "Frequency count must be greater than 0".to_string(),
            ));
        }
        Ok(Self { count, unit })
    }

    /// Date of the next occurrence after `last`
    pub fn next_after(&self, last: NaiveDate) -> Result<NaiveDate> {
        next_occurrence(last, self.count, self.unit)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.unit)
    }
}

impl FromStr for Frequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(count), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AppError::Validation(format!(
                "Invalid frequency '{}'. Expected '<count> <unit>'",
                s
            )));
        };

        let count: u32 = count
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid number in frequency: {}", s)))?;

        Frequency::new(count, unit.parse()?)
    }
}

/// Add `count` units to `last`, with weeks as 7 days and months as 30.
pub fn next_occurrence(last: NaiveDate, count: u32, unit: FrequencyUnit) -> Result<NaiveDate> {
    let offset = u64::from(count) * unit.days();

    last.checked_add_days(Days::new(offset)).ok_or_else(|| {
        AppError::Validation(format!(
            "Next occurrence of {} {} after {} is out of range",
            count, unit, last
        ))
    })
}
