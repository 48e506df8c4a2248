//! [`Directory`] over the store's reference tables, plus the small set of
//! writes needed to populate them.
//!
//! Employees, projects and teams are managed by their own modules in the
//! wider system; the `add_*`/`set_*_active` methods here exist so a fresh
//! database (or a test) can be seeded.

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;

use roster_core::{directory::Directory, employee::Hire};

use crate::{
  Error, Result,
  encode::{decode_date, encode_date},
  store::SqliteStore,
};

/// A reference table and its primary-key column.
#[derive(Clone, Copy)]
struct Table {
  name:   &'static str,
  key:    &'static str,
  entity: &'static str,
}

const EMPLOYEES: Table = Table { name: "employees", key: "employee_id", entity: "employee" };
const PROJECTS: Table = Table { name: "projects", key: "project_id", entity: "project" };
const TEAMS: Table = Table { name: "teams", key: "team_id", entity: "team" };
const STATUSES: Table = Table { name: "schedule_statuses", key: "status_id", entity: "status" };

impl SqliteStore {
  /// `None` if the row does not exist, otherwise its `is_active` flag.
  async fn active_flag(&self, table: Table, id: i64) -> Result<Option<bool>> {
    let sql = format!("SELECT is_active FROM {} WHERE {} = ?1", table.name, table.key);
    let flag = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id], |row| row.get::<_, bool>(0))
          .optional()?)
      })
      .await?;
    Ok(flag)
  }

  async fn set_active(&self, table: Table, id: i64, active: bool) -> Result<()> {
    let sql = format!("UPDATE {} SET is_active = ?1 WHERE {} = ?2", table.name, table.key);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![active, id])?))
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: table.entity, id });
    }
    Ok(())
  }

  async fn insert_named(&self, sql: &'static str, name: String) -> Result<i64> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![name])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  // ── Seeding ───────────────────────────────────────────────────────────────

  pub async fn add_employee(&self, name: impl Into<String>, hire_date: NaiveDate) -> Result<i64> {
    let name = name.into();
    let hired = encode_date(hire_date);
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (name, hire_date) VALUES (?1, ?2)",
          rusqlite::params![name, hired],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  pub async fn add_project(&self, name: impl Into<String>) -> Result<i64> {
    self
      .insert_named("INSERT INTO projects (name) VALUES (?1)", name.into())
      .await
  }

  pub async fn add_team(&self, name: impl Into<String>) -> Result<i64> {
    self
      .insert_named("INSERT INTO teams (name) VALUES (?1)", name.into())
      .await
  }

  pub async fn add_status(&self, code: impl Into<String>) -> Result<i64> {
    self
      .insert_named("INSERT INTO schedule_statuses (code) VALUES (?1)", code.into())
      .await
  }

  pub async fn set_employee_active(&self, id: i64, active: bool) -> Result<()> {
    self.set_active(EMPLOYEES, id, active).await
  }

  pub async fn set_project_active(&self, id: i64, active: bool) -> Result<()> {
    self.set_active(PROJECTS, id, active).await
  }

  pub async fn set_team_active(&self, id: i64, active: bool) -> Result<()> {
    self.set_active(TEAMS, id, active).await
  }

  pub async fn set_status_active(&self, id: i64, active: bool) -> Result<()> {
    self.set_active(STATUSES, id, active).await
  }
}

// ─── Directory impl ──────────────────────────────────────────────────────────

impl Directory for SqliteStore {
  type Error = Error;

  async fn employee_exists(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(EMPLOYEES, id).await?.is_some())
  }

  async fn employee_is_active(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(EMPLOYEES, id).await? == Some(true))
  }

  async fn project_exists(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(PROJECTS, id).await?.is_some())
  }

  async fn project_is_active(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(PROJECTS, id).await? == Some(true))
  }

  async fn team_exists(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(TEAMS, id).await?.is_some())
  }

  async fn team_is_active(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(TEAMS, id).await? == Some(true))
  }

  async fn status_exists(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(STATUSES, id).await?.is_some())
  }

  async fn status_is_active(&self, id: i64) -> Result<bool> {
    Ok(self.active_flag(STATUSES, id).await? == Some(true))
  }

  async fn employee_hire_date(&self, id: i64) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT hire_date FROM employees WHERE employee_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    raw.as_deref().map(decode_date).transpose()
  }

  async fn hires_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Hire>> {
    let from_str = encode_date(from);
    let to_str = encode_date(to);

    let rows: Vec<(i64, String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT employee_id, name, hire_date FROM employees
           WHERE hire_date BETWEEN ?1 AND ?2
           ORDER BY hire_date, employee_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(employee_id, name, hired)| {
        Ok(Hire { employee_id, name, hire_date: decode_date(&hired)? })
      })
      .collect()
  }
}
