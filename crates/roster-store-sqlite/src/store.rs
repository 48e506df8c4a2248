//! [`SqliteStore`], the SQLite implementation of [`ScheduleStore`].

use std::path::Path;

use chrono::{Days, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use roster_core::{
  conflict::conflicts_among,
  interval::Interval,
  schedule::{NewSchedule, ScheduleRecord},
  store::{ScheduleQuery, ScheduleStore, SortOrder, WriteOutcome},
};

use crate::{
  Error, Result,
  encode::{RECORD_COLUMNS, RECORD_JOINS, RawScheduleRecord, encode_date, encode_dt, encode_time},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace inside one `BEGIN IMMEDIATE` transaction, refusing the
  /// write if the candidate overlaps any of the employee's other rows.
  ///
  /// The immediate transaction takes SQLite's write lock before the overlap
  /// read, so no other writer can add a row between the check and the write.
  async fn guarded_write(
    &self,
    replace_id: Option<i64>,
    input: NewSchedule,
  ) -> Result<WriteOutcome> {
    let candidate = input
      .interval()
      .unwrap_or_else(|| Interval::full_day(input.date));

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(id) = replace_id {
          let exists = tx
            .query_row(
              "SELECT 1 FROM schedules WHERE schedule_id = ?1",
              rusqlite::params![id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if !exists {
            return Ok(WriteOutcome::NotFound);
          }
        }

        let peers = load_window(&tx, &input)?;
        let clashes = conflicts_among(&candidate, &peers, replace_id);
        if !clashes.is_empty() {
          // Dropping `tx` rolls back.
          return Ok(WriteOutcome::Conflicted(clashes));
        }

        let now = encode_dt(Utc::now());
        let date = encode_date(input.date);
        let start = input.start_time.map(encode_time);
        let end = input.end_time.map(encode_time);

        let id = match replace_id {
          Some(id) => {
            tx.execute(
              "UPDATE schedules SET
                 employee_id = ?1, project_id = ?2, team_id = ?3, status_id = ?4,
                 date = ?5, start_time = ?6, end_time = ?7, confirmed = ?8,
                 location = ?9, notes = ?10, updated_at = ?11
               WHERE schedule_id = ?12",
              rusqlite::params![
                input.employee_id,
                input.project_id,
                input.team_id,
                input.status_id,
                date,
                start,
                end,
                input.confirmed,
                input.location,
                input.notes,
                now,
                id,
              ],
            )?;
            id
          }
          None => {
            tx.execute(
              "INSERT INTO schedules (
                 employee_id, project_id, team_id, status_id,
                 date, start_time, end_time, confirmed,
                 location, notes, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
              rusqlite::params![
                input.employee_id,
                input.project_id,
                input.team_id,
                input.status_id,
                date,
                start,
                end,
                input.confirmed,
                input.location,
                input.notes,
                now,
              ],
            )?;
            tx.last_insert_rowid()
          }
        };

        let record = fetch_record(&tx, id)?;
        tx.commit()?;
        Ok(WriteOutcome::Written(record))
      })
      .await?;

    if let WriteOutcome::Conflicted(peers) = &outcome {
      debug!(
        conflicting = ?peers.iter().map(ScheduleRecord::id).collect::<Vec<_>>(),
        "guarded write refused"
      );
    }
    Ok(outcome)
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run on the connection thread, inside `Connection::call`.

fn decoded(raw: RawScheduleRecord) -> tokio_rusqlite::Result<ScheduleRecord> {
  raw
    .into_record()
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

fn fetch_record(
  conn: &rusqlite::Connection,
  id: i64,
) -> tokio_rusqlite::Result<ScheduleRecord> {
  let raw = conn.query_row(
    &format!("SELECT {RECORD_COLUMNS} {RECORD_JOINS} WHERE s.schedule_id = ?1"),
    rusqlite::params![id],
    RawScheduleRecord::from_row,
  )?;
  decoded(raw)
}

/// The employee's rows on the candidate's date and the days either side.
fn load_window(
  conn: &rusqlite::Connection,
  input: &NewSchedule,
) -> tokio_rusqlite::Result<Vec<ScheduleRecord>> {
  let from = input.date.checked_sub_days(Days::new(1)).unwrap_or(input.date);
  let to = input.date.checked_add_days(Days::new(1)).unwrap_or(input.date);

  let mut stmt = conn.prepare(&format!(
    "SELECT {RECORD_COLUMNS} {RECORD_JOINS}
     WHERE s.employee_id = ?1 AND s.date BETWEEN ?2 AND ?3"
  ))?;
  let raws = stmt
    .query_map(
      rusqlite::params![input.employee_id, encode_date(from), encode_date(to)],
      RawScheduleRecord::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(decoded).collect()
}

/// Shared `WHERE` clause for search and count; binds `?1`..`?8`.
const FILTER: &str = "
  WHERE (?1 IS NULL OR s.employee_id = ?1)
    AND (?2 IS NULL OR s.project_id  = ?2)
    AND (?3 IS NULL OR s.team_id     = ?3)
    AND (?4 IS NULL OR s.status_id   = ?4)
    AND (?5 IS NULL OR s.confirmed   = ?5)
    AND (?6 IS NULL OR s.date       >= ?6)
    AND (?7 IS NULL OR s.date       <= ?7)
    AND (?8 IS NULL OR s.location LIKE ?8)";

/// Owned, `Send` copies of the filter parameters.
struct FilterParams {
  employee_id: Option<i64>,
  project_id:  Option<i64>,
  team_id:     Option<i64>,
  status_id:   Option<i64>,
  confirmed:   Option<bool>,
  date_from:   Option<String>,
  date_to:     Option<String>,
  location:    Option<String>,
}

impl From<&ScheduleQuery> for FilterParams {
  fn from(q: &ScheduleQuery) -> Self {
    Self {
      employee_id: q.employee_id,
      project_id:  q.project_id,
      team_id:     q.team_id,
      status_id:   q.status_id,
      confirmed:   q.confirmed,
      date_from:   q.date_from.map(encode_date),
      date_to:     q.date_to.map(encode_date),
      location:    q.location.as_deref().map(|t| format!("%{t}%")),
    }
  }
}

fn order_clause(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Newest => "ORDER BY s.date DESC, s.start_time ASC, s.schedule_id ASC",
    SortOrder::Oldest => "ORDER BY s.date ASC, s.start_time ASC, s.schedule_id ASC",
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  async fn get_schedule(&self, id: i64) -> Result<Option<ScheduleRecord>> {
    let raw: Option<RawScheduleRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {RECORD_COLUMNS} {RECORD_JOINS} WHERE s.schedule_id = ?1"),
            rusqlite::params![id],
            RawScheduleRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawScheduleRecord::into_record).transpose()
  }

  async fn search(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleRecord>> {
    let p = FilterParams::from(query);
    let order = order_clause(query.order);
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawScheduleRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {RECORD_COLUMNS} {RECORD_JOINS} {FILTER} {order} LIMIT ?9 OFFSET ?10"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              p.employee_id,
              p.project_id,
              p.team_id,
              p.status_id,
              p.confirmed,
              p.date_from,
              p.date_to,
              p.location,
              limit_val,
              offset_val,
            ],
            RawScheduleRecord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScheduleRecord::into_record).collect()
  }

  async fn count(&self, query: &ScheduleQuery) -> Result<u64> {
    let p = FilterParams::from(query);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM schedules s {FILTER}"),
          rusqlite::params![
            p.employee_id,
            p.project_id,
            p.team_id,
            p.status_id,
            p.confirmed,
            p.date_from,
            p.date_to,
            p.location,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(n.max(0) as u64)
  }

  async fn insert_schedule(&self, input: NewSchedule) -> Result<WriteOutcome> {
    self.guarded_write(None, input).await
  }

  async fn replace_schedule(&self, id: i64, input: NewSchedule) -> Result<WriteOutcome> {
    self.guarded_write(Some(id), input).await
  }

  async fn delete_schedule(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM schedules WHERE schedule_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
