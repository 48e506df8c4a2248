//! Admission checks for a candidate schedule.
//!
//! Stages run in a fixed order and the first failure wins:
//!
//! 1. structure (ids, time pairing, text lengths)
//! 2. duration band
//! 3. calendar window around today
//! 4. referenced employee/project/team/status exist and are active
//! 5. no overlap with the employee's other entries
//!
//! Validation never writes.

use chrono::Timelike as _;

use crate::{
  Error, Result,
  clock::Clock,
  conflict::ConflictDetector,
  directory::Directory,
  error::{Conflicts, Entity, Problem},
  interval::Interval,
  policy::Policy,
  schedule::NewSchedule,
  store::ScheduleStore,
};

pub struct Validator<'a, S, D, C> {
  pub store:     &'a S,
  pub directory: &'a D,
  pub clock:     &'a C,
  pub policy:    &'a Policy,
}

impl<S, D, C> Validator<'_, S, D, C>
where
  S: ScheduleStore,
  D: Directory,
  C: Clock,
{
  /// Run all stages. `exclude_id` is the row being updated, if any, so it is
  /// not reported as conflicting with itself.
  pub async fn validate(
    &self,
    candidate: &NewSchedule,
    exclude_id: Option<i64>,
  ) -> Result<Interval> {
    let interval = check_structure(candidate, self.policy)?;
    self.policy.check_duration(interval.duration())?;
    self.policy.check_calendar(candidate.date, self.clock.today())?;
    self.check_references(candidate).await?;
    self.check_conflicts(candidate.employee_id, &interval, exclude_id).await?;
    Ok(interval)
  }

  async fn check_references(&self, c: &NewSchedule) -> Result<()> {
    let dir = self.directory;

    let exists = dir.employee_exists(c.employee_id).await.map_err(Error::repository)?;
    let active = exists
      && dir.employee_is_active(c.employee_id).await.map_err(Error::repository)?;
    refuse_unless(Entity::Employee, c.employee_id, exists, active)?;

    if let Some(id) = c.project_id {
      let exists = dir.project_exists(id).await.map_err(Error::repository)?;
      let active = exists && dir.project_is_active(id).await.map_err(Error::repository)?;
      refuse_unless(Entity::Project, id, exists, active)?;
    }

    if let Some(id) = c.team_id {
      let exists = dir.team_exists(id).await.map_err(Error::repository)?;
      let active = exists && dir.team_is_active(id).await.map_err(Error::repository)?;
      refuse_unless(Entity::Team, id, exists, active)?;
    }

    if let Some(id) = c.status_id {
      let exists = dir.status_exists(id).await.map_err(Error::repository)?;
      let active = exists && dir.status_is_active(id).await.map_err(Error::repository)?;
      refuse_unless(Entity::Status, id, exists, active)?;
    }

    Ok(())
  }

  async fn check_conflicts(
    &self,
    employee_id: i64,
    interval: &Interval,
    exclude_id: Option<i64>,
  ) -> Result<()> {
    let found = ConflictDetector::new(self.store)
      .find_conflicts(employee_id, interval, exclude_id)
      .await
      .map_err(Error::repository)?;
    if found.is_empty() {
      Ok(())
    } else {
      Err(Error::Conflict(Conflicts::from_records(&found)))
    }
  }
}

fn refuse_unless(entity: Entity, id: i64, exists: bool, active: bool) -> Result<()> {
  let problem = match (exists, active) {
    (false, _) => Problem::Missing,
    (true, false) => Problem::Inactive,
    (true, true) => return Ok(()),
  };
  Err(Error::Referential { entity, id, problem })
}

/// Stage 1: field-level checks that need no I/O. On success returns the
/// candidate's normalised interval.
pub fn check_structure(c: &NewSchedule, policy: &Policy) -> Result<Interval> {
  if c.employee_id <= 0 {
    return Err(Error::structural("employee_id", "must be a positive id"));
  }
  for (field, id) in [
    ("project_id", c.project_id),
    ("team_id", c.team_id),
    ("status_id", c.status_id),
  ] {
    if id.is_some_and(|id| id <= 0) {
      return Err(Error::structural(field, "must be a positive id"));
    }
  }

  // Times are stored to the second; a fraction would be dropped on write.
  for (field, time) in [("start_time", c.start_time), ("end_time", c.end_time)] {
    if time.is_some_and(|t| t.nanosecond() != 0) {
      return Err(Error::structural(field, "must be whole seconds"));
    }
  }

  let interval = match (c.start_time, c.end_time) {
    (Some(start), Some(end)) if start == end => {
      return Err(Error::structural(
        "end_time",
        "must differ from start_time",
      ));
    }
    (Some(_), None) => {
      return Err(Error::structural(
        "end_time",
        "is required when start_time is set",
      ));
    }
    (None, Some(_)) => {
      return Err(Error::structural(
        "start_time",
        "is required when end_time is set",
      ));
    }
    (start, end) => Interval::of(c.date, start, end)
      .ok_or_else(|| Error::structural("start_time", "is incomplete"))?,
  };

  if let Some(location) = &c.location
    && location.chars().count() > policy.max_location_len
  {
    return Err(Error::structural(
      "location",
      format!("must be at most {} characters", policy.max_location_len),
    ));
  }
  if let Some(notes) = &c.notes
    && notes.chars().count() > policy.max_notes_len
  {
    return Err(Error::structural(
      "notes",
      format!("must be at most {} characters", policy.max_notes_len),
    ));
  }

  Ok(interval)
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;
  use crate::error::ErrorKind;

  fn candidate() -> NewSchedule {
    NewSchedule::new(1, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()).with_times(
      NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
  }

  fn field_of(err: Error) -> &'static str {
    match err {
      Error::Structural { field, .. } => field,
      other => panic!("expected structural error, got {other:?}"),
    }
  }

  #[test]
  fn accepts_well_formed_candidate() {
    let interval = check_structure(&candidate(), &Policy::default()).unwrap();
    assert_eq!(interval.hours(), 8.0);
  }

  #[test]
  fn rejects_non_positive_ids() {
    let mut c = candidate();
    c.employee_id = 0;
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "employee_id");

    let mut c = candidate();
    c.team_id = Some(-2);
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "team_id");
  }

  #[test]
  fn rejects_equal_times() {
    let mut c = candidate();
    c.end_time = c.start_time;
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "end_time");
  }

  #[test]
  fn rejects_half_specified_times() {
    let mut c = candidate();
    c.end_time = None;
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "end_time");

    let mut c = candidate();
    c.start_time = None;
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "start_time");
  }

  #[test]
  fn rejects_fractional_seconds() {
    let at = |s, ms| NaiveTime::from_hms_milli_opt(9, 0, s, ms).unwrap();

    let c = NewSchedule::new(1, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
      .with_times(at(0, 700), at(0, 200));
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "start_time");

    let mut c = candidate();
    c.end_time = Some(NaiveTime::from_hms_milli_opt(17, 0, 0, 1).unwrap());
    assert_eq!(field_of(check_structure(&c, &Policy::default()).unwrap_err()), "end_time");
  }

  #[test]
  fn full_day_is_structurally_valid() {
    let c = NewSchedule::new(1, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    let interval = check_structure(&c, &Policy::default()).unwrap();
    assert_eq!(interval.hours(), 24.0);
  }

  #[test]
  fn rejects_overlong_location() {
    let mut c = candidate();
    c.location = Some("x".repeat(256));
    let err = check_structure(&c, &Policy::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(field_of(err), "location");
  }

  #[test]
  fn referential_problem_prefers_missing() {
    assert!(refuse_unless(Entity::Team, 3, true, true).is_ok());
    assert!(matches!(
      refuse_unless(Entity::Team, 3, false, false),
      Err(Error::Referential { problem: Problem::Missing, .. })
    ));
    assert!(matches!(
      refuse_unless(Entity::Team, 3, true, false),
      Err(Error::Referential { problem: Problem::Inactive, .. })
    ));
  }
}
