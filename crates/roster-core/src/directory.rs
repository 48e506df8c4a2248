//! The `Directory` trait: existence and activity checks for the entities a
//! schedule refers to.
//!
//! Employees, projects and teams are managed by other parts of the system.
//! The scheduler only needs to ask whether an id exists and is active, plus a
//! couple of employee facts for reporting.

use std::future::Future;

use chrono::NaiveDate;

use crate::employee::Hire;

pub trait Directory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn employee_exists(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn employee_is_active(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn project_exists(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn project_is_active(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn team_exists(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn team_is_active(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn status_exists(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn status_is_active(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `None` if the employee does not exist.
  fn employee_hire_date(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  /// Employees hired within `[from, to]`, ordered by hire date.
  fn hires_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Hire>, Self::Error>> + Send + '_;
}
