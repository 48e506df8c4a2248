//! Overlap detection between schedule entries.
//!
//! Found conflicts are returned as data; turning them into an error is the
//! caller's decision.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  interval::Interval,
  query::Queries,
  schedule::ScheduleRecord,
  store::ScheduleStore,
};

/// Every peer whose interval overlaps `candidate`, skipping `exclude_id`.
///
/// Callers pass the employee's rows for the candidate's date and its two
/// neighbours; rows further away cannot overlap a single entry.
pub fn conflicts_among(
  candidate: &Interval,
  peers: &[ScheduleRecord],
  exclude_id: Option<i64>,
) -> Vec<ScheduleRecord> {
  peers
    .iter()
    .filter(|p| Some(p.id()) != exclude_id)
    .filter(|p| p.interval().overlaps(candidate))
    .cloned()
    .collect()
}

/// Looks up an employee's neighbouring entries and checks a candidate
/// against them.
pub struct ConflictDetector<'a, S> {
  queries: Queries<'a, S>,
}

impl<'a, S: ScheduleStore> ConflictDetector<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { queries: Queries::new(store) } }

  pub async fn find_conflicts(
    &self,
    employee_id: i64,
    candidate: &Interval,
    exclude_id: Option<i64>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let date = candidate.start().date();
    let peers = self.queries.around(employee_id, date).await?;
    Ok(conflicts_among(candidate, &peers, exclude_id))
  }
}

// ─── Double-booking audit ────────────────────────────────────────────────────

/// Two stored entries for the same employee that overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleBooking {
  pub employee_id:     i64,
  pub first:           ScheduleRecord,
  pub second:          ScheduleRecord,
  pub overlap_minutes: i64,
}

/// Report every overlapping pair among already-stored entries.
///
/// Pairs are ordered by employee, then by the first entry's start.
pub fn find_double_bookings(entries: &[ScheduleRecord]) -> Vec<DoubleBooking> {
  let mut by_employee: BTreeMap<i64, Vec<(Interval, &ScheduleRecord)>> =
    BTreeMap::new();
  for record in entries {
    by_employee
      .entry(record.schedule.employee_id)
      .or_default()
      .push((record.interval(), record));
  }

  let mut found = Vec::new();
  for (employee_id, mut rows) in by_employee {
    rows.sort_by_key(|(interval, record)| (interval.start(), record.id()));
    for (i, (a, first)) in rows.iter().enumerate() {
      for (b, second) in &rows[i + 1..] {
        // Sorted by start: nothing later can reach back into `a`.
        if b.start() >= a.end() {
          break;
        }
        if a.overlaps(b) {
          found.push(DoubleBooking {
            employee_id,
            first: (*first).clone(),
            second: (*second).clone(),
            overlap_minutes: a.overlap(b).num_minutes(),
          });
        }
      }
    }
  }
  found
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime, Utc};

  use super::*;
  use crate::schedule::Schedule;

  fn d(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, day).unwrap() }

  fn t(h: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, 0, 0).unwrap() }

  fn record(
    id: i64,
    employee_id: i64,
    date: NaiveDate,
    times: Option<(u32, u32)>,
  ) -> ScheduleRecord {
    ScheduleRecord {
      schedule: Schedule {
        schedule_id: id,
        employee_id,
        project_id: None,
        team_id: None,
        status_id: None,
        date,
        start_time: times.map(|(s, _)| t(s)),
        end_time: times.map(|(_, e)| t(e)),
        confirmed: false,
        location: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
      },
      employee: None,
      project: None,
      team: None,
      status: None,
    }
  }

  fn ids(records: &[ScheduleRecord]) -> Vec<i64> {
    records.iter().map(ScheduleRecord::id).collect()
  }

  #[test]
  fn adjacent_entry_is_not_a_conflict() {
    let peers = [record(1, 1, d(4), Some((9, 12)))];
    let candidate = Interval::timed(d(4), t(12), t(15));
    assert!(conflicts_among(&candidate, &peers, None).is_empty());
  }

  #[test]
  fn exact_duplicate_is_a_conflict() {
    let peers = [record(1, 1, d(4), Some((9, 12)))];
    let candidate = Interval::timed(d(4), t(9), t(12));
    assert_eq!(ids(&conflicts_among(&candidate, &peers, None)), [1]);
  }

  #[test]
  fn excluded_id_is_skipped() {
    let peers = [record(1, 1, d(4), Some((9, 12)))];
    let candidate = Interval::timed(d(4), t(10), t(13));
    assert!(conflicts_among(&candidate, &peers, Some(1)).is_empty());
  }

  #[test]
  fn full_day_candidate_hits_every_entry_that_day() {
    let peers = [
      record(1, 1, d(4), Some((6, 7))),
      record(2, 1, d(4), Some((20, 23))),
      record(3, 1, d(5), Some((9, 12))),
    ];
    let candidate = Interval::full_day(d(4));
    assert_eq!(ids(&conflicts_among(&candidate, &peers, None)), [1, 2]);
  }

  #[test]
  fn full_day_peer_blocks_any_candidate_that_day() {
    let peers = [record(1, 1, d(4), None)];
    for (s, e) in [(0, 1), (12, 13), (23, 2)] {
      let candidate = Interval::timed(d(4), t(s), t(e));
      assert_eq!(ids(&conflicts_among(&candidate, &peers, None)), [1]);
    }
  }

  #[test]
  fn overnight_peer_conflicts_with_next_morning() {
    let peers = [record(1, 1, d(4), Some((22, 2)))];
    let candidate = Interval::timed(d(5), t(1), t(3));
    assert_eq!(ids(&conflicts_among(&candidate, &peers, None)), [1]);
  }

  #[test]
  fn double_bookings_are_grouped_per_employee() {
    let entries = [
      record(1, 1, d(4), Some((9, 17))),
      record(2, 1, d(4), Some((16, 18))),
      record(3, 1, d(4), Some((17, 19))),
      // Same times, different employee: not a double booking.
      record(4, 2, d(4), Some((9, 17))),
      record(5, 2, d(5), None),
      record(6, 2, d(5), Some((10, 11))),
    ];

    let found = find_double_bookings(&entries);
    let pairs: Vec<_> = found
      .iter()
      .map(|b| (b.employee_id, b.first.id(), b.second.id(), b.overlap_minutes))
      .collect();

    assert_eq!(pairs, [(1, 1, 2, 60), (1, 2, 3, 60), (2, 5, 6, 60)]);
  }

  #[test]
  fn no_entries_no_double_bookings() {
    assert!(find_double_bookings(&[]).is_empty());
  }
}
