//! HTTP layer for the contacts app.
//!
//! Exposes an axum [`Router`] serving the HTML contact pages, local-account
//! login, and the assistant webhook, backed by any [`ContactStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;
pub mod session;
pub mod webhook;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  response::Redirect,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use yum_core::store::ContactStore;

use auth::{UserAccount, WebhookAuth};
use handlers::{contacts, health, login};
use session::SessionStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`ContactStore`] implementation backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Sqlite,
  Memory,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `YUM_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  #[serde(default)]
  pub backend:        Backend,
  /// SQLite database file; ignored by the memory backend.
  pub store_path:     PathBuf,
  /// Reported as `source` in webhook responses.
  pub webhook_source: String,
  #[serde(default)]
  pub users:          Vec<UserAccount>,
  /// When set, webhook calls must carry matching Basic credentials.
  #[serde(default)]
  pub webhook_auth:   Option<WebhookAuth>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContactStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionStore>,
}

impl<S: ContactStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      config:   Arc::new(config),
      sessions: Arc::new(SessionStore::new()),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/",                   get(|| async { Redirect::to("/contacts") }))
    .route("/contacts",           get(contacts::list::<S>).post(contacts::create::<S>))
    .route("/contacts/mine",      get(contacts::list_mine::<S>))
    .route("/contacts/add",       get(contacts::add_form))
    .route(
      "/contacts/{id}",
      get(contacts::detail::<S>)
        .post(contacts::post_to_contact::<S>)
        .put(contacts::replace::<S>),
    )
    .route("/contacts/{id}/edit", get(contacts::edit_form::<S>))
    .route("/login",              get(login::form).post(login::submit::<S>))
    .route("/logout",             post(login::logout::<S>))
    .route("/_ah/health",         get(health))
    .route("/contactsWebhook",    post(webhook::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
