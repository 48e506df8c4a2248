//! Employee-derived facts. Employees themselves are owned elsewhere; this
//! crate only sees hire dates and computes tenure from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Seniority band derived from whole years of tenure.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
  Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TenureBucket {
  /// Under one year.
  New,
  /// One to three years.
  Junior,
  /// Three to seven years.
  Intermediate,
  /// Seven to fifteen years.
  Senior,
  /// Fifteen years or more.
  Veteran,
}

impl TenureBucket {
  pub fn from_years(years: u32) -> Self {
    match years {
      0 => Self::New,
      1..=2 => Self::Junior,
      3..=6 => Self::Intermediate,
      7..=14 => Self::Senior,
      _ => Self::Veteran,
    }
  }
}

/// Tenure computed on demand; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureFact {
  pub employee_id: i64,
  pub hire_date:   NaiveDate,
  pub as_of:       NaiveDate,
  pub years:       u32,
  pub months:      u32,
  pub days:        u32,
  pub bucket:      TenureBucket,
}

/// An employee's hire event, as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hire {
  pub employee_id: i64,
  pub name:        String,
  pub hire_date:   NaiveDate,
}

/// Hires in a period, restricted to Monday–Friday hire dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HireReport {
  pub from:                NaiveDate,
  pub to:                  NaiveDate,
  pub hires:               Vec<Hire>,
  /// Hires dropped because they fell on a weekend.
  pub excluded_on_weekend: usize,
}
