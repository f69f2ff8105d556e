//! Error type for `sirat-store-sqlite`.

use sirat_core::store::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sirat_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value outside its domain.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("procedure not found: {0}")]
  ProcedureNotFound(uuid::Uuid),

  #[error("procedure {id} is at version {actual}, expected {expected}")]
  VersionConflict {
    id:       uuid::Uuid,
    expected: i64,
    actual:   i64,
  },
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::ProcedureNotFound(_) => ErrorKind::NotFound,
      Error::VersionConflict { .. } => ErrorKind::Conflict,
      Error::Core(_) => ErrorKind::Invalid,
      Error::Database(_)
      | Error::Uuid(_)
      | Error::DateParse(_)
      | Error::Decode(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
