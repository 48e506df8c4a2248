//! Typed retrieval on top of [`ScheduleStore::search`].
//!
//! Each method builds a [`ScheduleQuery`] and hands it to the backend; none
//! of them filter in memory.

use chrono::{NaiveDate, TimeDelta};

use crate::{
  schedule::{DateRange, ScheduleRecord},
  store::{Page, ScheduleQuery, ScheduleStore, SortOrder},
};

pub struct Queries<'a, S> {
  store: &'a S,
}

impl<'a, S: ScheduleStore> Queries<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn by_id(&self, id: i64) -> Result<Option<ScheduleRecord>, S::Error> {
    self.store.get_schedule(id).await
  }

  pub async fn by_employee(
    &self,
    employee_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      employee_id: Some(employee_id),
      ..ScheduleQuery::default()
    }
    .in_range(range);
    self.store.search(&query).await
  }

  pub async fn by_date(
    &self,
    date: NaiveDate,
    employee_id: Option<i64>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery { employee_id, ..ScheduleQuery::default() }
      .in_range(Some(DateRange::day(date)));
    self.store.search(&query).await
  }

  pub async fn by_project(
    &self,
    project_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      project_id: Some(project_id),
      ..ScheduleQuery::default()
    }
    .in_range(range);
    self.store.search(&query).await
  }

  pub async fn by_team(
    &self,
    team_id: i64,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      team_id: Some(team_id),
      ..ScheduleQuery::default()
    }
    .in_range(range);
    self.store.search(&query).await
  }

  pub async fn by_confirmation(
    &self,
    confirmed: bool,
    range: Option<DateRange>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      confirmed: Some(confirmed),
      ..ScheduleQuery::default()
    }
    .in_range(range);
    self.store.search(&query).await
  }

  /// Every entry in `range`, oldest first.
  pub async fn in_range(
    &self,
    range: DateRange,
    employee_id: Option<i64>,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      employee_id,
      order: SortOrder::Oldest,
      ..ScheduleQuery::default()
    }
    .in_range(Some(range));
    self.store.search(&query).await
  }

  /// The employee's entries that could overlap something on `date`: the day
  /// itself plus its neighbours, since overnight entries reach into the next
  /// day.
  pub async fn around(
    &self,
    employee_id: i64,
    date: NaiveDate,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let range = DateRange::new(date - TimeDelta::days(1), date + TimeDelta::days(1));
    self.by_employee(employee_id, Some(range)).await
  }

  /// Apply `page` on top of `filter`, overriding any paging already set.
  pub async fn search(
    &self,
    filter: &ScheduleQuery,
    page: Page,
  ) -> Result<Vec<ScheduleRecord>, S::Error> {
    let query = ScheduleQuery {
      limit: page.limit,
      offset: page.offset,
      ..filter.clone()
    };
    self.store.search(&query).await
  }

  pub async fn count(&self, filter: &ScheduleQuery) -> Result<u64, S::Error> {
    self.store.count(filter).await
  }
}
