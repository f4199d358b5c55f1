//! HTTP Basic-auth extractor backed by the `users` table.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{extract::FromRequestParts, http::request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use quill_core::{
  media::MediaStore,
  permission::{Capability, Role},
  store::ContentStore,
};

use crate::{AppState, error::Error};

/// The authenticated account behind one request. Listing it in a handler
/// signature makes the route require valid credentials.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub id:       i64,
  pub username: String,
  pub role:     Role,
}

impl CurrentUser {
  /// Capability guard: `Forbidden` when the role lacks the bit.
  pub fn require(&self, cap: Capability) -> Result<(), Error> {
    if self.role.can(cap) {
      Ok(())
    } else {
      Err(Error::Forbidden)
    }
  }
}

/// Split a `Basic <base64>` header value into username and password.
fn parse_basic(header_val: &str) -> Option<(String, String)> {
  let encoded = header_val.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_string(), password.to_string()))
}

impl<S, M> FromRequestParts<AppState<S, M>> for CurrentUser
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let header_val = parts
      .headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(Error::Unauthorized)?;

    let (username, password) =
      parse_basic(header_val).ok_or(Error::Unauthorized)?;

    let (user, stored_hash) = state
      .store
      .get_user_by_username(&username)
      .await?
      .ok_or(Error::Unauthorized)?;

    let parsed_hash =
      PasswordHash::new(&stored_hash).map_err(|_| Error::Unauthorized)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::Unauthorized)?;

    Ok(CurrentUser {
      id:       user.id,
      username: user.username,
      role:     user.role,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_well_formed_header() {
    let encoded = B64.encode("alice:s3cret");
    let parsed = parse_basic(&format!("Basic {encoded}"));
    assert_eq!(parsed, Some(("alice".to_string(), "s3cret".to_string())));
  }

  #[test]
  fn password_may_contain_colons() {
    let encoded = B64.encode("alice:a:b:c");
    let parsed = parse_basic(&format!("Basic {encoded}"));
    assert_eq!(parsed, Some(("alice".to_string(), "a:b:c".to_string())));
  }

  #[test]
  fn rejects_non_basic_schemes_and_bad_base64() {
    assert!(parse_basic("Bearer abcdef").is_none());
    assert!(parse_basic("Basic !!!not-base64!!!").is_none());
  }

  #[test]
  fn require_is_a_bit_test() {
    let user = CurrentUser {
      id:       1,
      username: "carol".to_string(),
      role:     Role::User,
    };
    assert!(user.require(Capability::COMMENT).is_ok());
    assert!(matches!(
      user.require(Capability::ADMINISTER),
      Err(Error::Forbidden)
    ));
  }
}
