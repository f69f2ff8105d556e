//! Error types for `sirat-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("procedure title must not be blank")]
  BlankTitle,

  #[error("unknown procedure status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
