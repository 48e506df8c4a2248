//! Schedule entries: who works where, on which day, and when.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

// ─── Date range ──────────────────────────────────────────────────────────────

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Self { Self { from, to } }

  /// A single-day range.
  pub fn day(date: NaiveDate) -> Self { Self { from: date, to: date } }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.from <= date && date <= self.to
  }
}

// ─── Persisted entry ─────────────────────────────────────────────────────────

/// A stored schedule row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
  pub schedule_id: i64,
  pub employee_id: i64,
  pub project_id:  Option<i64>,
  pub team_id:     Option<i64>,
  pub status_id:   Option<i64>,
  pub date:        NaiveDate,
  /// Both times absent means a full-day entry.
  pub start_time:  Option<NaiveTime>,
  pub end_time:    Option<NaiveTime>,
  pub confirmed:   bool,
  pub location:    Option<String>,
  pub notes:       Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Schedule {
  /// The normalised interval this entry occupies. A row with only one of its
  /// two times set is treated as occupying the whole day.
  pub fn interval(&self) -> Interval {
    Interval::of(self.date, self.start_time, self.end_time)
      .unwrap_or_else(|| Interval::full_day(self.date))
  }

  pub fn is_full_day(&self) -> bool {
    self.start_time.is_none() && self.end_time.is_none()
  }
}

/// A named association loaded alongside a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub id:     i64,
  pub name:   String,
  pub active: bool,
}

/// A schedule bundled with its eagerly loaded associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
  pub schedule: Schedule,
  pub employee: Option<Link>,
  pub project:  Option<Link>,
  pub team:     Option<Link>,
  pub status:   Option<Link>,
}

impl ScheduleRecord {
  pub fn id(&self) -> i64 { self.schedule.schedule_id }

  pub fn interval(&self) -> Interval { self.schedule.interval() }
}

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input to [`crate::scheduler::Scheduler::create_schedule`].
/// Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
  pub employee_id: i64,
  #[serde(default)]
  pub project_id:  Option<i64>,
  #[serde(default)]
  pub team_id:     Option<i64>,
  #[serde(default)]
  pub status_id:   Option<i64>,
  pub date:        NaiveDate,
  #[serde(default)]
  pub start_time:  Option<NaiveTime>,
  #[serde(default)]
  pub end_time:    Option<NaiveTime>,
  #[serde(default)]
  pub confirmed:   bool,
  #[serde(default)]
  pub location:    Option<String>,
  #[serde(default)]
  pub notes:       Option<String>,
}

impl NewSchedule {
  /// A full-day, unconfirmed entry with no associations.
  pub fn new(employee_id: i64, date: NaiveDate) -> Self {
    Self {
      employee_id,
      project_id: None,
      team_id: None,
      status_id: None,
      date,
      start_time: None,
      end_time: None,
      confirmed: false,
      location: None,
      notes: None,
    }
  }

  pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
    self.start_time = Some(start);
    self.end_time = Some(end);
    self
  }

  pub fn interval(&self) -> Option<Interval> {
    Interval::of(self.date, self.start_time, self.end_time)
  }
}

impl From<&Schedule> for NewSchedule {
  fn from(s: &Schedule) -> Self {
    Self {
      employee_id: s.employee_id,
      project_id:  s.project_id,
      team_id:     s.team_id,
      status_id:   s.status_id,
      date:        s.date,
      start_time:  s.start_time,
      end_time:    s.end_time,
      confirmed:   s.confirmed,
      location:    s.location.clone(),
      notes:       s.notes.clone(),
    }
  }
}

/// A partial update. Outer `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
  pub employee_id: Option<i64>,
  pub project_id:  Option<Option<i64>>,
  pub team_id:     Option<Option<i64>>,
  pub status_id:   Option<Option<i64>>,
  pub date:        Option<NaiveDate>,
  pub start_time:  Option<Option<NaiveTime>>,
  pub end_time:    Option<Option<NaiveTime>>,
  pub confirmed:   Option<bool>,
  pub location:    Option<Option<String>>,
  pub notes:       Option<Option<String>>,
}

impl SchedulePatch {
  /// Set both times at once.
  pub fn times(start: NaiveTime, end: NaiveTime) -> Self {
    Self {
      start_time: Some(Some(start)),
      end_time: Some(Some(end)),
      ..Self::default()
    }
  }

  /// Overlay this patch on an existing row, producing the full candidate
  /// that gets validated.
  pub fn apply(self, existing: &Schedule) -> NewSchedule {
    let base = NewSchedule::from(existing);
    NewSchedule {
      employee_id: self.employee_id.unwrap_or(base.employee_id),
      project_id:  self.project_id.unwrap_or(base.project_id),
      team_id:     self.team_id.unwrap_or(base.team_id),
      status_id:   self.status_id.unwrap_or(base.status_id),
      date:        self.date.unwrap_or(base.date),
      start_time:  self.start_time.unwrap_or(base.start_time),
      end_time:    self.end_time.unwrap_or(base.end_time),
      confirmed:   self.confirmed.unwrap_or(base.confirmed),
      location:    self.location.unwrap_or(base.location),
      notes:       self.notes.unwrap_or(base.notes),
    }
  }
}
