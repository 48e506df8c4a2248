//! The `ScheduleStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The scheduler depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::{DateRange, NewSchedule, ScheduleRecord};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Result ordering for [`ScheduleStore::search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  /// Date descending, then start time ascending.
  #[default]
  Newest,
  /// Date ascending, then start time ascending.
  Oldest,
}

/// Parameters for [`ScheduleStore::search`] and [`ScheduleStore::count`].
/// Every filter is optional; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleQuery {
  pub employee_id: Option<i64>,
  pub project_id:  Option<i64>,
  pub team_id:     Option<i64>,
  pub status_id:   Option<i64>,
  pub confirmed:   Option<bool>,
  pub date_from:   Option<NaiveDate>,
  pub date_to:     Option<NaiveDate>,
  /// Substring match on the location text.
  pub location:    Option<String>,
  pub order:       SortOrder,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

impl ScheduleQuery {
  pub fn in_range(mut self, range: Option<DateRange>) -> Self {
    if let Some(r) = range {
      self.date_from = Some(r.from);
      self.date_to = Some(r.to);
    }
    self
  }
}

/// Pagination window applied on top of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Write outcome ───────────────────────────────────────────────────────────

/// What a guarded write did.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
  Written(ScheduleRecord),
  /// The write was refused because these rows overlap the candidate. Nothing
  /// was persisted.
  Conflicted(Vec<ScheduleRecord>),
  /// The row to replace does not exist.
  NotFound,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a schedule storage backend.
///
/// Writes are guarded: a backend must re-check the candidate for overlaps
/// with [`crate::conflict::conflicts_among`] inside the same transaction as
/// the write, so that two concurrent writers for one employee cannot both
/// succeed. Reads always load the employee/project/team/status links.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a schedule by id. Returns `None` if not found.
  fn get_schedule(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ScheduleRecord>, Self::Error>> + Send + '_;

  fn search<'a>(
    &'a self,
    query: &'a ScheduleQuery,
  ) -> impl Future<Output = Result<Vec<ScheduleRecord>, Self::Error>> + Send + 'a;

  /// Number of rows matching `query`, ignoring `limit`, `offset` and `order`.
  fn count<'a>(
    &'a self,
    query: &'a ScheduleQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Insert a new row unless it overlaps one of the employee's entries.
  fn insert_schedule(
    &self,
    input: NewSchedule,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Overwrite row `id` unless the new values overlap one of the employee's
  /// other entries.
  fn replace_schedule(
    &self,
    id: i64,
    input: NewSchedule,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Returns `false` if no row had that id.
  fn delete_schedule(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
