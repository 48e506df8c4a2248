//! Time-based reporting over queried schedule entries.
//!
//! Every function here is pure: it takes the entries (and, where relevant, a
//! reference date) and returns zeroed or empty results when there is nothing
//! to report.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  employee::{Hire, HireReport, TenureBucket, TenureFact},
  schedule::{DateRange, ScheduleRecord},
};

// ─── Hours ───────────────────────────────────────────────────────────────────

/// Sum of every entry's normalised duration, in hours.
pub fn hours_worked(entries: &[ScheduleRecord]) -> f64 {
  entries.iter().map(|e| e.interval().hours()).sum()
}

// ─── Tenure ──────────────────────────────────────────────────────────────────

/// Calendar-aware tenure between `hire_date` and `today`.
///
/// Whole months are counted by stepping the hire date forward month by month
/// (end-of-month dates clamp, so a 31 January hire reaches one month on the
/// last day of February); the remainder is reported in days. A hire date in
/// the future yields zero tenure.
pub fn tenure(employee_id: i64, hire_date: NaiveDate, today: NaiveDate) -> TenureFact {
  let total_months = whole_months_between(hire_date, today);
  let anchor = hire_date
    .checked_add_months(Months::new(total_months))
    .unwrap_or(hire_date);
  let days = if today > anchor { (today - anchor).num_days() as u32 } else { 0 };
  let years = total_months / 12;

  TenureFact {
    employee_id,
    hire_date,
    as_of: today,
    years,
    months: total_months % 12,
    days,
    bucket: TenureBucket::from_years(years),
  }
}

fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
  if to <= from {
    return 0;
  }
  let raw = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
  let mut months = raw.max(0) as u32;
  while months > 0
    && from
      .checked_add_months(Months::new(months))
      .is_none_or(|stepped| stepped > to)
  {
    months -= 1;
  }
  months
}

// ─── Business days ───────────────────────────────────────────────────────────

/// Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
  !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Keep only entries dated Monday through Friday.
pub fn business_day_filter(entries: Vec<ScheduleRecord>) -> Vec<ScheduleRecord> {
  entries
    .into_iter()
    .filter(|e| is_business_day(e.schedule.date))
    .collect()
}

/// Keep weekday hires inside `range`, counting the weekend ones dropped.
pub fn business_day_hires(range: DateRange, hires: Vec<Hire>) -> HireReport {
  let (kept, weekend): (Vec<Hire>, Vec<Hire>) = hires
    .into_iter()
    .filter(|h| range.contains(h.hire_date))
    .partition(|h| is_business_day(h.hire_date));
  HireReport {
    from:                range.from,
    to:                  range.to,
    hires:               kept,
    excluded_on_weekend: weekend.len(),
  }
}

// ─── Period buckets ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
  #[default]
  Day,
  /// ISO weeks, starting Monday.
  Week,
  Month,
}

impl Granularity {
  /// The first date of the bucket containing `date`.
  pub fn truncate(self, date: NaiveDate) -> NaiveDate {
    match self {
      Self::Day => date,
      Self::Week => {
        date - TimeDelta::days(date.weekday().num_days_from_monday() as i64)
      }
      Self::Month => date.with_day(1).unwrap_or(date),
    }
  }

  /// Human-readable label for the bucket starting at `start`.
  pub fn label(self, start: NaiveDate) -> String {
    match self {
      Self::Day => start.format("%Y-%m-%d").to_string(),
      Self::Week => {
        let week = start.iso_week();
        format!("{}-W{:02}", week.year(), week.week())
      }
      Self::Month => start.format("%Y-%m").to_string(),
    }
  }
}

/// Aggregate of all entries whose date falls in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
  pub period:         String,
  pub starts_on:      NaiveDate,
  pub total_hours:    f64,
  pub schedule_count: usize,
  pub employee_count: usize,
}

/// Group entries by period, oldest period first.
///
/// Overnight entries count toward the period of their start date.
pub fn period_summary(
  entries: &[ScheduleRecord],
  granularity: Granularity,
) -> Vec<PeriodBucket> {
  #[derive(Default)]
  struct Acc {
    hours:     f64,
    count:     usize,
    employees: BTreeSet<i64>,
  }

  let mut buckets: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
  for e in entries {
    let acc = buckets
      .entry(granularity.truncate(e.schedule.date))
      .or_default();
    acc.hours += e.interval().hours();
    acc.count += 1;
    acc.employees.insert(e.schedule.employee_id);
  }

  buckets
    .into_iter()
    .map(|(starts_on, acc)| PeriodBucket {
      period: granularity.label(starts_on),
      starts_on,
      total_hours: acc.hours,
      schedule_count: acc.count,
      employee_count: acc.employees.len(),
    })
    .collect()
}

// ─── Productivity ────────────────────────────────────────────────────────────

/// A 0–100 score made of two halves.
///
/// - Volume: average hours per worked day relative to `baseline_hours`,
///   worth up to 50 points.
/// - Consistency: `1 - (max - min) / avg` over daily hours, worth up to 50
///   points and never negative.
///
/// Zero when there are no entries or the average is zero.
pub fn productivity_score(entries: &[ScheduleRecord], baseline_hours: f64) -> f64 {
  let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for e in entries {
    *daily.entry(e.schedule.date).or_default() += e.interval().hours();
  }
  if daily.is_empty() || baseline_hours <= 0.0 {
    return 0.0;
  }

  let avg = daily.values().sum::<f64>() / daily.len() as f64;
  if avg <= 0.0 {
    return 0.0;
  }
  let max = daily.values().copied().fold(f64::MIN, f64::max);
  let min = daily.values().copied().fold(f64::MAX, f64::min);

  let volume = (avg / baseline_hours * 50.0).min(50.0);
  let consistency = ((1.0 - (max - min) / avg) * 50.0).clamp(0.0, 50.0);
  (volume + consistency).clamp(0.0, 100.0)
}
