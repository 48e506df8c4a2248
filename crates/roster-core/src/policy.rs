//! Tunable scheduling limits.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Limits applied by the validator and the productivity report.
///
/// Every field has a default, so a partial `[policy]` table in a config file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
  /// Exclusive lower bound on a schedule's duration.
  pub min_duration_minutes: i64,
  /// Inclusive upper bound on a schedule's duration.
  pub max_duration_hours:   i64,
  /// How far before today a schedule date may lie.
  pub past_window_days:     i64,
  /// How far after today a schedule date may lie.
  pub future_window_days:   i64,
  /// Hours per day that earn the full productivity volume score.
  pub baseline_hours:       f64,
  pub max_location_len:     usize,
  pub max_notes_len:        usize,
}

impl Default for Policy {
  fn default() -> Self {
    Self {
      min_duration_minutes: 15,
      max_duration_hours:   24,
      past_window_days:     365,
      future_window_days:   730,
      baseline_hours:       8.0,
      max_location_len:     255,
      max_notes_len:        2000,
    }
  }
}

impl Policy {
  /// Accept durations in `(min, max]`. A bound too large for `TimeDelta`
  /// saturates.
  pub fn check_duration(&self, actual: TimeDelta) -> Result<()> {
    let min = TimeDelta::try_minutes(self.min_duration_minutes).unwrap_or(TimeDelta::MAX);
    let max = TimeDelta::try_hours(self.max_duration_hours).unwrap_or(TimeDelta::MAX);
    if actual <= min || actual > max {
      return Err(Error::Duration {
        actual,
        min_minutes: self.min_duration_minutes,
        max_hours: self.max_duration_hours,
      });
    }
    Ok(())
  }

  /// Accept dates within `[today - past, today + future]`. A window reaching
  /// past chrono's date range is clamped to `NaiveDate::MIN`/`MAX`.
  pub fn check_calendar(&self, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let earliest = TimeDelta::try_days(self.past_window_days)
      .and_then(|past| today.checked_sub_signed(past))
      .unwrap_or(NaiveDate::MIN);
    let latest = TimeDelta::try_days(self.future_window_days)
      .and_then(|future| today.checked_add_signed(future))
      .unwrap_or(NaiveDate::MAX);
    if date < earliest || date > latest {
      return Err(Error::CalendarRange { date, earliest, latest });
    }
    Ok(())
  }
}
