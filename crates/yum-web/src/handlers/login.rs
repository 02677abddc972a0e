//! Session login and logout against the configured local accounts.

use axum::{
  Form,
  extract::{Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use yum_core::store::ContactStore;

use crate::{
  AppState, auth, render,
  session::{expired_session_cookie, session_cookie, session_id},
};

const DEFAULT_REDIRECT: &str = "/contacts";

/// Only same-site absolute paths are followed after login. Browsers read
/// `/\host` like `//host`, and control characters cannot go in a header.
fn safe_redirect(target: Option<&str>) -> &str {
  match target {
    Some(t) if is_local_path(t) => t,
    _ => DEFAULT_REDIRECT,
  }
}

fn is_local_path(t: &str) -> bool {
  let mut chars = t.chars();
  chars.next() == Some('/')
    && !matches!(chars.next(), Some('/' | '\\'))
    && !t.chars().any(char::is_control)
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
  pub redirect: Option<String>,
}

/// `GET /login[?redirect=/path]`
pub async fn form(Query(q): Query<LoginQuery>) -> Html<String> {
  Html(render::login_page(safe_redirect(q.redirect.as_deref()), None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
  pub redirect: Option<String>,
}

/// `POST /login`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Response
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let target = safe_redirect(form.redirect.as_deref()).to_owned();

  let Some(profile) =
    auth::authenticate(&state.config.users, &form.username, &form.password)
  else {
    tracing::warn!(username = %form.username, "failed login");
    return (
      StatusCode::UNAUTHORIZED,
      Html(render::login_page(&target, Some("Unknown username or password."))),
    )
      .into_response();
  };

  tracing::info!(user = %profile.id, "login");
  let id = state.sessions.create(profile).await;
  (
    [(header::SET_COOKIE, session_cookie(&id, state.sessions.ttl()))],
    Redirect::to(&target),
  )
    .into_response()
}

/// `POST /logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Response
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  if let Some(id) = session_id(&headers)
    && let Some(profile) = state.sessions.remove(&id).await
  {
    tracing::info!(user = %profile.id, "logout");
  }
  (
    [(header::SET_COOKIE, expired_session_cookie())],
    Redirect::to(DEFAULT_REDIRECT),
  )
    .into_response()
}
