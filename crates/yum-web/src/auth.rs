//! Password verification for interactive logins and the webhook's HTTP
//! Basic-auth guard.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::HeaderMap;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::{error::Error, session::Profile};

/// A local account allowed to sign in through `/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAccount {
  /// Stable identifier recorded as a contact's `created_by_id`.
  pub id:            String,
  pub display_name:  String,
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Credentials the assistant framework must present to call the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAuth {
  pub username:      String,
  pub password_hash: String,
}

/// Check `password` against an argon2 PHC string. Malformed hashes never
/// verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
    .unwrap_or(false)
}

/// Find the account matching `username` and `password`.
pub fn authenticate(
  accounts: &[UserAccount],
  username: &str,
  password: &str,
) -> Option<Profile> {
  accounts
    .iter()
    .find(|a| a.username == username)
    .filter(|a| verify_password(password, &a.password_hash))
    .map(|a| Profile {
      id:           a.id.clone(),
      display_name: a.display_name.clone(),
    })
}

/// Verify HTTP Basic credentials from request headers.
pub fn verify_basic(headers: &HeaderMap, config: &WebhookAuth) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username || !verify_password(password, &config.password_hash) {
    return Err(Error::Unauthorized);
  }

  Ok(())
}

#[cfg(test)]
pub(crate) fn hash_for_tests(password: &str) -> String {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .unwrap()
    .to_string()
}
