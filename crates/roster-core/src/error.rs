//! Error types for `roster-core`.
//!
//! One variant per rejection kind. Every variant renders a stable message so
//! callers can show field-level problems (`Structural`) differently from
//! global ones (`Conflict`, `Repository`).

use std::fmt;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::schedule::ScheduleRecord;

// ─── Supporting types ────────────────────────────────────────────────────────

/// The aggregate an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
  Schedule,
  Employee,
  Project,
  Team,
  Status,
}

/// Why a referenced entity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Problem {
  Missing,
  Inactive,
}

/// An existing schedule that collides with a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictingEntry {
  pub schedule_id: i64,
  pub date:        NaiveDate,
  pub start_time:  Option<NaiveTime>,
  pub end_time:    Option<NaiveTime>,
}

impl From<&ScheduleRecord> for ConflictingEntry {
  fn from(record: &ScheduleRecord) -> Self {
    let s = &record.schedule;
    Self {
      schedule_id: s.schedule_id,
      date:        s.date,
      start_time:  s.start_time,
      end_time:    s.end_time,
    }
  }
}

impl fmt::Display for ConflictingEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.start_time, self.end_time) {
      (Some(start), Some(end)) => write!(
        f,
        "#{} on {} {}-{}",
        self.schedule_id,
        self.date,
        start.format("%H:%M"),
        end.format("%H:%M"),
      ),
      _ => write!(f, "#{} on {} (full day)", self.schedule_id, self.date),
    }
  }
}

/// The full list of entries a candidate overlaps, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflicts(pub Vec<ConflictingEntry>);

impl Conflicts {
  pub fn from_records(records: &[ScheduleRecord]) -> Self {
    Self(records.iter().map(ConflictingEntry::from).collect())
  }

  pub fn ids(&self) -> Vec<i64> {
    self.0.iter().map(|c| c.schedule_id).collect()
  }
}

impl fmt::Display for Conflicts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, entry) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{entry}")?;
    }
    Ok(())
  }
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid {field}: {reason}")]
  Structural { field: &'static str, reason: String },

  #[error(
    "schedule lasts {} minutes; it must be longer than {min_minutes} minutes \
     and at most {max_hours} hours",
    .actual.num_minutes()
  )]
  Duration {
    actual:      TimeDelta,
    min_minutes: i64,
    max_hours:   i64,
  },

  #[error("date {date} is outside the accepted window {earliest} to {latest}")]
  CalendarRange {
    date:     NaiveDate,
    earliest: NaiveDate,
    latest:   NaiveDate,
  },

  #[error("{entity} {id} is {problem}")]
  Referential {
    entity:  Entity,
    id:      i64,
    problem: Problem,
  },

  #[error("schedule conflicts with existing entries: {0}")]
  Conflict(Conflicts),

  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },

  #[error("repository error: {0}")]
  Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Stable, serialisable discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  Structural,
  Duration,
  CalendarRange,
  Referential,
  Conflict,
  NotFound,
  Repository,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Structural { .. } => ErrorKind::Structural,
      Self::Duration { .. } => ErrorKind::Duration,
      Self::CalendarRange { .. } => ErrorKind::CalendarRange,
      Self::Referential { .. } => ErrorKind::Referential,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Repository(_) => ErrorKind::Repository,
    }
  }

  /// Only storage failures may succeed on a later attempt.
  pub fn is_retryable(&self) -> bool { matches!(self, Self::Repository(_)) }

  pub(crate) fn structural(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Structural { field, reason: reason.into() }
  }

  pub(crate) fn repository<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Repository(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
