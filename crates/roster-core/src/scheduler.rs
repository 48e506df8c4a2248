//! [`Scheduler`], the single entry point for schedule writes and reports.
//!
//! Writes run the [`Validator`] first and only reach the store once every
//! stage has passed. The store's own guarded write is the second line of
//! defence against a concurrent writer slipping in between the validator's
//! read and the insert; both surface as [`Error::Conflict`].

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  analytics::{self, Granularity, PeriodBucket},
  clock::Clock,
  conflict::{self, DoubleBooking},
  directory::Directory,
  employee::{HireReport, TenureFact},
  error::{Conflicts, Entity},
  policy::Policy,
  query::Queries,
  schedule::{DateRange, NewSchedule, SchedulePatch, ScheduleRecord},
  store::{Page, ScheduleQuery, ScheduleStore, WriteOutcome},
  validate::Validator,
};

pub struct Scheduler<S, D, C> {
  store:     S,
  directory: D,
  clock:     C,
  policy:    Policy,
}

impl<S, D, C> Scheduler<S, D, C>
where
  S: ScheduleStore,
  D: Directory,
  C: Clock,
{
  pub fn new(store: S, directory: D, clock: C) -> Self {
    Self::with_policy(store, directory, clock, Policy::default())
  }

  pub fn with_policy(store: S, directory: D, clock: C, policy: Policy) -> Self {
    Self { store, directory, clock, policy }
  }

  pub fn policy(&self) -> &Policy { &self.policy }

  fn validator(&self) -> Validator<'_, S, D, C> {
    Validator {
      store:     &self.store,
      directory: &self.directory,
      clock:     &self.clock,
      policy:    &self.policy,
    }
  }

  fn queries(&self) -> Queries<'_, S> { Queries::new(&self.store) }

  // ── Writes ──────────────────────────────────────────────────────────────

  pub async fn create_schedule(&self, candidate: NewSchedule) -> Result<ScheduleRecord> {
    self.admit(&candidate, None).await?;

    let employee_id = candidate.employee_id;
    let outcome = self
      .store
      .insert_schedule(candidate)
      .await
      .map_err(Error::repository)?;

    let record = self.settle(outcome, None)?;
    info!(schedule_id = record.id(), employee_id, "schedule created");
    Ok(record)
  }

  pub async fn update_schedule(
    &self,
    id: i64,
    patch: SchedulePatch,
  ) -> Result<ScheduleRecord> {
    let existing = self
      .queries()
      .by_id(id)
      .await
      .map_err(Error::repository)?
      .ok_or(Error::NotFound { entity: Entity::Schedule, id })?;

    let merged = patch.apply(&existing.schedule);
    self.admit(&merged, Some(id)).await?;

    let outcome = self
      .store
      .replace_schedule(id, merged)
      .await
      .map_err(Error::repository)?;

    let record = self.settle(outcome, Some(id))?;
    info!(schedule_id = id, "schedule updated");
    Ok(record)
  }

  pub async fn delete_schedule(&self, id: i64) -> Result<bool> {
    let deleted = self
      .store
      .delete_schedule(id)
      .await
      .map_err(Error::repository)?;
    if !deleted {
      return Err(Error::NotFound { entity: Entity::Schedule, id });
    }
    info!(schedule_id = id, "schedule deleted");
    Ok(true)
  }

  async fn admit(&self, candidate: &NewSchedule, exclude_id: Option<i64>) -> Result<()> {
    match self.validator().validate(candidate, exclude_id).await {
      Ok(_) => Ok(()),
      Err(Error::Conflict(conflicts)) => {
        warn!(
          employee_id = candidate.employee_id,
          date = %candidate.date,
          conflicting = ?conflicts.ids(),
          "schedule rejected: overlaps existing entries"
        );
        Err(Error::Conflict(conflicts))
      }
      Err(err) => {
        debug!(
          employee_id = candidate.employee_id,
          kind = ?err.kind(),
          "schedule rejected: {err}"
        );
        Err(err)
      }
    }
  }

  fn settle(&self, outcome: WriteOutcome, id: Option<i64>) -> Result<ScheduleRecord> {
    match outcome {
      WriteOutcome::Written(record) => Ok(record),
      WriteOutcome::Conflicted(peers) => {
        let conflicts = Conflicts::from_records(&peers);
        warn!(
          conflicting = ?conflicts.ids(),
          "schedule rejected at write time: a concurrent entry overlaps"
        );
        Err(Error::Conflict(conflicts))
      }
      WriteOutcome::NotFound => match id {
        Some(id) => Err(Error::NotFound { entity: Entity::Schedule, id }),
        // An insert has no target row; the backend broke its contract.
        None => Err(Error::Repository(
          "store reported a missing row for an insert".into(),
        )),
      },
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  pub async fn get_schedule(&self, id: i64) -> Result<ScheduleRecord> {
    self
      .queries()
      .by_id(id)
      .await
      .map_err(Error::repository)?
      .ok_or(Error::NotFound { entity: Entity::Schedule, id })
  }

  pub async fn query_schedules(
    &self,
    filter: &ScheduleQuery,
    page: Page,
  ) -> Result<Vec<ScheduleRecord>> {
    self.queries().search(filter, page).await.map_err(Error::repository)
  }

  pub async fn count_schedules(&self, filter: &ScheduleQuery) -> Result<u64> {
    self.queries().count(filter).await.map_err(Error::repository)
  }

  pub async fn schedules_for_employee(
    &self,
    employee_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>> {
    self
      .queries()
      .by_employee(employee_id, range)
      .await
      .map_err(Error::repository)
  }

  pub async fn schedules_on(
    &self,
    date: chrono::NaiveDate,
    employee_id: Option<i64>,
  ) -> Result<Vec<ScheduleRecord>> {
    self
      .queries()
      .by_date(date, employee_id)
      .await
      .map_err(Error::repository)
  }

  pub async fn schedules_for_project(
    &self,
    project_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>> {
    self
      .queries()
      .by_project(project_id, range)
      .await
      .map_err(Error::repository)
  }

  pub async fn schedules_for_team(
    &self,
    team_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>> {
    self
      .queries()
      .by_team(team_id, range)
      .await
      .map_err(Error::repository)
  }

  pub async fn schedules_by_confirmation(
    &self,
    confirmed: bool,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>> {
    self
      .queries()
      .by_confirmation(confirmed, range)
      .await
      .map_err(Error::repository)
  }

  // ── Reports ─────────────────────────────────────────────────────────────

  pub async fn get_employee_hours(&self, employee_id: i64, range: DateRange) -> Result<f64> {
    let entries = self.schedules_for_employee(employee_id, Some(range)).await?;
    Ok(analytics::hours_worked(&entries))
  }

  pub async fn get_tenure(&self, employee_id: i64) -> Result<TenureFact> {
    let hire_date = self
      .directory
      .employee_hire_date(employee_id)
      .await
      .map_err(Error::repository)?
      .ok_or(Error::NotFound { entity: Entity::Employee, id: employee_id })?;
    Ok(analytics::tenure(employee_id, hire_date, self.clock.today()))
  }

  pub async fn get_period_summary(
    &self,
    range: DateRange,
    granularity: Granularity,
    employee_id: Option<i64>,
  ) -> Result<Vec<PeriodBucket>> {
    let entries = self
      .queries()
      .in_range(range, employee_id)
      .await
      .map_err(Error::repository)?;
    Ok(analytics::period_summary(&entries, granularity))
  }

  pub async fn get_productivity(&self, employee_id: i64, range: DateRange) -> Result<f64> {
    let entries = self.schedules_for_employee(employee_id, Some(range)).await?;
    Ok(analytics::productivity_score(&entries, self.policy.baseline_hours))
  }

  /// Hours in `range` counting only Monday–Friday entries.
  pub async fn get_business_day_hours(
    &self,
    employee_id: i64,
    range: DateRange,
  ) -> Result<f64> {
    let entries = self.schedules_for_employee(employee_id, Some(range)).await?;
    Ok(analytics::hours_worked(&analytics::business_day_filter(entries)))
  }

  pub async fn business_day_hires(&self, range: DateRange) -> Result<HireReport> {
    let hires = self
      .directory
      .hires_between(range.from, range.to)
      .await
      .map_err(Error::repository)?;
    Ok(analytics::business_day_hires(range, hires))
  }

  /// Overlapping pairs already in storage, e.g. rows written before the
  /// guarded insert existed.
  pub async fn double_bookings(&self, range: DateRange) -> Result<Vec<DoubleBooking>> {
    let entries = self
      .queries()
      .in_range(range, None)
      .await
      .map_err(Error::repository)?;
    Ok(conflict::find_double_bookings(&entries))
  }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use chrono::{NaiveDate, NaiveTime, Utc};

  use super::*;
  use crate::{clock::FixedClock, employee::Hire, error::ErrorKind, schedule::Schedule};

  fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 4).unwrap() }

  /// Holds one row that disappears before any write lands, as if another
  /// writer deleted it between the read and the write.
  struct Vanishing {
    row: ScheduleRecord,
  }

  impl Vanishing {
    fn new() -> Self {
      let schedule = Schedule {
        schedule_id: 9,
        employee_id: 1,
        project_id:  None,
        team_id:     None,
        status_id:   None,
        date:        monday(),
        start_time:  NaiveTime::from_hms_opt(9, 0, 0),
        end_time:    NaiveTime::from_hms_opt(17, 0, 0),
        confirmed:   false,
        location:    None,
        notes:       None,
        created_at:  Utc::now(),
        updated_at:  Utc::now(),
      };
      Self {
        row: ScheduleRecord {
          schedule,
          employee: None,
          project: None,
          team: None,
          status: None,
        },
      }
    }
  }

  impl ScheduleStore for Vanishing {
    type Error = Infallible;

    async fn get_schedule(&self, id: i64) -> Result<Option<ScheduleRecord>, Infallible> {
      Ok((id == self.row.id()).then(|| self.row.clone()))
    }

    async fn search(&self, _: &ScheduleQuery) -> Result<Vec<ScheduleRecord>, Infallible> {
      Ok(Vec::new())
    }

    async fn count(&self, _: &ScheduleQuery) -> Result<u64, Infallible> { Ok(0) }

    async fn insert_schedule(&self, _: NewSchedule) -> Result<WriteOutcome, Infallible> {
      Ok(WriteOutcome::NotFound)
    }

    async fn replace_schedule(
      &self,
      _: i64,
      _: NewSchedule,
    ) -> Result<WriteOutcome, Infallible> {
      Ok(WriteOutcome::NotFound)
    }

    async fn delete_schedule(&self, _: i64) -> Result<bool, Infallible> { Ok(false) }
  }

  /// Every reference exists and is active.
  struct Everyone;

  impl Directory for Everyone {
    type Error = Infallible;

    async fn employee_exists(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn employee_is_active(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn project_exists(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn project_is_active(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn team_exists(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn team_is_active(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn status_exists(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn status_is_active(&self, _: i64) -> Result<bool, Infallible> { Ok(true) }

    async fn employee_hire_date(&self, _: i64) -> Result<Option<NaiveDate>, Infallible> {
      Ok(None)
    }

    async fn hires_between(
      &self,
      _: NaiveDate,
      _: NaiveDate,
    ) -> Result<Vec<Hire>, Infallible> {
      Ok(Vec::new())
    }
  }

  fn scheduler() -> Scheduler<Vanishing, Everyone, FixedClock> {
    Scheduler::new(Vanishing::new(), Everyone, FixedClock::on(monday()))
  }

  #[tokio::test]
  async fn update_of_row_deleted_mid_write_names_that_row() {
    let err = scheduler()
      .update_schedule(9, SchedulePatch { confirmed: Some(true), ..Default::default() })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: Entity::Schedule, id: 9 }));
  }

  #[tokio::test]
  async fn insert_reported_missing_is_a_storage_fault() {
    let candidate = NewSchedule::new(1, monday()).with_times(
      NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );
    let err = scheduler().create_schedule(candidate).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Repository);
    assert!(!matches!(err, Error::NotFound { .. }));
  }
}
