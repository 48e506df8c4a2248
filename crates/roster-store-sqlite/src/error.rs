//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
