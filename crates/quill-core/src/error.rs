//! Error types for `quill-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("category not found: {0:?}")]
  CategoryNotFound(String),

  #[error("tag not found: {0:?}")]
  TagNotFound(String),

  #[error("post not found: {0}")]
  PostNotFound(i64),

  #[error("comment not found: {0}")]
  CommentNotFound(i64),

  #[error("user not found: {0:?}")]
  UserNotFound(String),

  #[error("category already exists: {0:?}")]
  CategoryExists(String),

  #[error("username already taken: {0:?}")]
  UserExists(String),

  /// A reply referenced a parent comment that belongs to another post.
  #[error("comment {parent} does not belong to post {post}")]
  ParentMismatch { parent: i64, post: i64 },

  /// A stored value could not be decoded back into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  /// Upload gateway failure (object storage, local disk).
  #[error("upload failed: {0}")]
  Upload(String),

  /// Backend fault (database unavailable, I/O error, poisoned pool).
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend fault in [`Error::Storage`].
  pub fn storage(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Error::Storage(e.into())
  }

  /// `true` for the variants the HTTP layer maps to 404.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Error::CategoryNotFound(_)
        | Error::TagNotFound(_)
        | Error::PostNotFound(_)
        | Error::CommentNotFound(_)
        | Error::UserNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
