//! Error types for `yum-core`.

use thiserror::Error;

use crate::contact::ContactId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact not found: {0}")]
  NotFound(ContactId),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// A mutation touched a number of rows other than exactly one.
  #[error("expected 1 row affected for contact {id}, got {rows}")]
  UnexpectedRowCount { id: ContactId, rows: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of a store failure, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  InvalidArgument,
  UnexpectedRowCount,
  /// The storage medium itself failed (I/O, SQL, decoding of stored rows).
  Backend,
}

/// Implemented by every backend error so that callers (e.g. HTTP handlers)
/// can react to the kind of failure without knowing the concrete backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Self::UnexpectedRowCount { .. } => ErrorKind::UnexpectedRowCount,
    }
  }
}
