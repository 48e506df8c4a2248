//! Normalised, half-open time intervals.
//!
//! A schedule row stores a calendar date plus optional start and end
//! times-of-day. [`Interval`] turns that into a pair of absolute instants
//! `[start, end)`:
//!
//! - both times absent: the whole day, `[date 00:00, date+1 00:00)`;
//! - `end <= start`: the entry crosses midnight and `end` lands on the next
//!   day.
//!
//! [`Interval::overlaps`] is the only overlap predicate in the crate. Conflict
//! detection and the double-booking audit both go through it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
  start: NaiveDateTime,
  end:   NaiveDateTime,
}

impl Interval {
  /// Normalise a `(date, start, end)` triple.
  ///
  /// Returns `None` when exactly one of the two times is given; such a row has
  /// no defined extent.
  pub fn of(
    date: NaiveDate,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
  ) -> Option<Self> {
    match (start, end) {
      (None, None) => Some(Self::full_day(date)),
      (Some(start), Some(end)) => Some(Self::timed(date, start, end)),
      _ => None,
    }
  }

  /// `[date 00:00, date+1 00:00)`.
  pub fn full_day(date: NaiveDate) -> Self {
    let start = date.and_time(NaiveTime::MIN);
    Self { start, end: start + TimeDelta::days(1) }
  }

  /// A timed interval; an `end` at or before `start` rolls over to the next
  /// day.
  pub fn timed(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
    let start_dt = date.and_time(start);
    let mut end_dt = date.and_time(end);
    if end <= start {
      end_dt += TimeDelta::days(1);
    }
    Self { start: start_dt, end: end_dt }
  }

  pub fn start(&self) -> NaiveDateTime { self.start }

  pub fn end(&self) -> NaiveDateTime { self.end }

  pub fn duration(&self) -> TimeDelta { self.end - self.start }

  /// Duration as fractional hours.
  pub fn hours(&self) -> f64 { self.duration().num_seconds() as f64 / 3600.0 }

  /// Half-open intersection: `[a0, a1)` and `[b0, b1)` overlap iff
  /// `a0 < b1 && b0 < a1`. Touching endpoints do not overlap.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.start < other.end && other.start < self.end
  }

  /// Length of the shared span, zero when the intervals do not overlap.
  pub fn overlap(&self, other: &Self) -> TimeDelta {
    if !self.overlaps(other) {
      return TimeDelta::zero();
    }
    self.end.min(other.end) - self.start.max(other.start)
  }
}
