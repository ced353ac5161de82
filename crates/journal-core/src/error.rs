//! Error types for `journal-core`.

use thiserror::Error;

/// Domain failures shared by every layer.
///
/// Storage backends wrap this type in their own error enum; the HTTP layer
/// maps each variant onto a status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A required field is missing or blank, an id is non-positive, or the
  /// emotion set is empty.
  #[error("{0}")]
  Validation(String),

  /// An entry type or emotion id in the input does not exist.
  #[error("{0}")]
  Reference(String),

  /// A unique key is already taken, or a row is still referenced.
  #[error("{0}")]
  Conflict(String),

  #[error("{0} not found")]
  NotFound(String),

  /// The caller is authenticated but may not touch this resource.
  #[error("forbidden")]
  Forbidden,

  #[error("unauthorized")]
  Unauthorized,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types that may carry a domain [`Error`].
///
/// Lets callers that are generic over a store classify failures without
/// knowing the concrete backend.
pub trait DomainError {
  /// The wrapped domain error, or `None` for infrastructure failures.
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}
