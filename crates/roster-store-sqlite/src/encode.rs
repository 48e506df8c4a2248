//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, times-of-day as `HH:MM:SS` (both sort
//! lexically), and timestamps as RFC 3339 strings. Booleans are `0`/`1`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use roster_core::schedule::{Link, Schedule, ScheduleRecord};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveTime ───────────────────────────────────────────────────────────────

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawScheduleRecord::from_row`]; use with
/// [`RECORD_JOINS`].
pub const RECORD_COLUMNS: &str = "
  s.schedule_id, s.employee_id, s.project_id, s.team_id, s.status_id,
  s.date, s.start_time, s.end_time, s.confirmed, s.location, s.notes,
  s.created_at, s.updated_at,
  e.name,  e.is_active,
  p.name,  p.is_active,
  t.name,  t.is_active,
  st.code, st.is_active";

/// Every association is loaded in the same statement as the schedule row.
pub const RECORD_JOINS: &str = "
  FROM schedules s
  LEFT JOIN employees         e  ON e.employee_id = s.employee_id
  LEFT JOIN projects          p  ON p.project_id  = s.project_id
  LEFT JOIN teams             t  ON t.team_id     = s.team_id
  LEFT JOIN schedule_statuses st ON st.status_id  = s.status_id";

/// Raw column values read from a `schedules` row joined with its
/// associations.
pub struct RawScheduleRecord {
  // schedules columns
  pub schedule_id:     i64,
  pub employee_id:     i64,
  pub project_id:      Option<i64>,
  pub team_id:         Option<i64>,
  pub status_id:       Option<i64>,
  pub date:            String,
  pub start_time:      Option<String>,
  pub end_time:        Option<String>,
  pub confirmed:       bool,
  pub location:        Option<String>,
  pub notes:           Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
  // joins
  pub employee_name:   Option<String>,
  pub employee_active: Option<bool>,
  pub project_name:    Option<String>,
  pub project_active:  Option<bool>,
  pub team_name:       Option<String>,
  pub team_active:     Option<bool>,
  pub status_code:     Option<String>,
  pub status_active:   Option<bool>,
}

impl RawScheduleRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      schedule_id:     row.get(0)?,
      employee_id:     row.get(1)?,
      project_id:      row.get(2)?,
      team_id:         row.get(3)?,
      status_id:       row.get(4)?,
      date:            row.get(5)?,
      start_time:      row.get(6)?,
      end_time:        row.get(7)?,
      confirmed:       row.get(8)?,
      location:        row.get(9)?,
      notes:           row.get(10)?,
      created_at:      row.get(11)?,
      updated_at:      row.get(12)?,
      employee_name:   row.get(13)?,
      employee_active: row.get(14)?,
      project_name:    row.get(15)?,
      project_active:  row.get(16)?,
      team_name:       row.get(17)?,
      team_active:     row.get(18)?,
      status_code:     row.get(19)?,
      status_active:   row.get(20)?,
    })
  }

  pub fn into_record(self) -> Result<ScheduleRecord> {
    let schedule = Schedule {
      schedule_id: self.schedule_id,
      employee_id: self.employee_id,
      project_id:  self.project_id,
      team_id:     self.team_id,
      status_id:   self.status_id,
      date:        decode_date(&self.date)?,
      start_time:  self.start_time.as_deref().map(decode_time).transpose()?,
      end_time:    self.end_time.as_deref().map(decode_time).transpose()?,
      confirmed:   self.confirmed,
      location:    self.location,
      notes:       self.notes,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    };

    Ok(ScheduleRecord {
      employee: link(Some(self.employee_id), self.employee_name, self.employee_active),
      project:  link(self.project_id, self.project_name, self.project_active),
      team:     link(self.team_id, self.team_name, self.team_active),
      status:   link(self.status_id, self.status_code, self.status_active),
      schedule,
    })
  }
}

fn link(id: Option<i64>, name: Option<String>, active: Option<bool>) -> Option<Link> {
  match (id, name) {
    (Some(id), Some(name)) => Some(Link { id, name, active: active.unwrap_or(false) }),
    _ => None,
  }
}
