//! Cookie-keyed server-side sessions.
//!
//! A session maps a random opaque id (carried in the `yum_session` cookie) to
//! the signed-in user's [`Profile`]. Sessions expire [`SESSION_TTL_SECS`]
//! after login. They are kept in process memory only.

use std::{collections::HashMap, convert::Infallible};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore as _};
use tokio::sync::RwLock;
use yum_core::store::ContactStore;

use crate::AppState;

pub const SESSION_COOKIE: &str = "yum_session";

/// Lifetime of a session in seconds, counted from login.
pub const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// The signed-in user as far as contact provenance is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
  pub id:           String,
  pub display_name: String,
}

#[derive(Debug)]
struct Session {
  profile:    Profile,
  expires_at: DateTime<Utc>,
}

impl Session {
  fn is_live(&self, now: DateTime<Utc>) -> bool { now < self.expires_at }
}

#[derive(Debug)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Session>>,
  ttl:      TimeDelta,
}

impl Default for SessionStore {
  fn default() -> Self { Self::with_ttl(TimeDelta::seconds(SESSION_TTL_SECS)) }
}

impl SessionStore {
  pub fn new() -> Self { Self::default() }

  pub fn with_ttl(ttl: TimeDelta) -> Self {
    Self {
      sessions: RwLock::default(),
      ttl,
    }
  }

  pub fn ttl(&self) -> TimeDelta { self.ttl }

  /// Start a session for `profile` and return its id. Expired sessions are
  /// pruned on the way.
  pub async fn create(&self, profile: Profile) -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let id = hex::encode(bytes);

    let now = Utc::now();
    let mut sessions = self.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| s.is_live(now));
    let pruned = before - sessions.len();
    if pruned > 0 {
      tracing::debug!(pruned, "dropped expired sessions");
    }
    sessions.insert(id.clone(), Session {
      profile,
      expires_at: now + self.ttl,
    });
    id
  }

  /// The live session's profile. An expired session is removed.
  pub async fn get(&self, id: &str) -> Option<Profile> {
    let now = Utc::now();
    {
      let sessions = self.sessions.read().await;
      match sessions.get(id) {
        None => return None,
        Some(s) if s.is_live(now) => return Some(s.profile.clone()),
        Some(_) => {}
      }
    }
    self.sessions.write().await.remove(id);
    None
  }

  pub async fn remove(&self, id: &str) -> Option<Profile> {
    self.sessions.write().await.remove(id).map(|s| s.profile)
  }

  #[cfg(test)]
  async fn len(&self) -> usize { self.sessions.read().await.len() }
}

/// Pull the session id out of the `Cookie` header(s), if present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value establishing a session that lasts `ttl`.
pub fn session_cookie(id: &str, ttl: TimeDelta) -> String {
  format!(
    "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
    ttl.num_seconds()
  )
}

/// `Set-Cookie` value that makes the browser forget the session.
pub fn expired_session_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extractor yielding the signed-in user, or `None` for anonymous requests.
pub struct CurrentUser(pub Option<Profile>);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let profile = match session_id(&parts.headers) {
      Some(id) => state.sessions.get(&id).await,
      None     => None,
    };
    Ok(CurrentUser(profile))
  }
}
