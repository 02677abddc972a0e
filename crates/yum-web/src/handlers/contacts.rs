//! Handlers for the `/contacts` HTML pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts` | All contacts |
//! | `GET`  | `/contacts/mine` | Contacts created by the session user; login required |
//! | `GET`  | `/contacts/add` | Empty form |
//! | `GET`  | `/contacts/{id}` | Detail page |
//! | `GET`  | `/contacts/{id}/edit` | Pre-filled form |
//! | `POST` | `/contacts` | Create from form; redirects to the detail page |
//! | `POST` | `/contacts/{id}` | Update from form; redirects to the detail page |
//! | `PUT`  | `/contacts/{id}` | Same as `POST` |
//! | `POST` | `/contacts/{id}:delete` | Delete; redirects to `/contacts` |

use axum::{
  Form,
  extract::{Path, State, rejection::FormRejection},
  response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use yum_core::{Contact, ContactId, store::ContactStore};

use crate::{
  AppState,
  error::Error,
  render,
  session::{CurrentUser, Profile},
};

const DELETE_SUFFIX: &str = ":delete";

// ─── Path parsing ────────────────────────────────────────────────────────────

/// Parse the `{id}` path segment. Only plain decimal digits are accepted.
pub fn parse_id(raw: &str) -> Result<ContactId, Error> {
  if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::BadRequest(format!("bad contact id: {raw:?}")));
  }
  raw
    .parse()
    .map_err(|e| Error::BadRequest(format!("bad contact id {raw:?}: {e}")))
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Fields posted by the add/edit form.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
  #[serde(default)]
  pub firstname:     String,
  #[serde(default)]
  pub lastname:      String,
  #[serde(default)]
  pub address:       String,
  #[serde(default)]
  pub email:         String,
  #[serde(default)]
  pub phone:         String,
  #[serde(default, rename = "createdBy")]
  pub created_by:    String,
  #[serde(default, rename = "createdByID")]
  pub created_by_id: String,
}

impl ContactForm {
  /// Build a contact. When the form does not name a creator, the signed-in
  /// user becomes the creator, or the contact is marked anonymous.
  pub fn into_contact(self, user: Option<&Profile>) -> Contact {
    let mut contact = Contact {
      first_name: self.firstname,
      last_name: self.lastname,
      address: self.address,
      email: self.email,
      phone: self.phone,
      created_by: self.created_by,
      created_by_id: self.created_by_id,
      ..Contact::default()
    };

    if contact.created_by_id.is_empty() {
      match user {
        Some(p) => {
          contact.created_by = p.display_name.clone();
          contact.created_by_id = p.id.clone();
        }
        None => contact.set_creator_anonymous(),
      }
    }
    contact
  }
}

fn detail_location(id: ContactId) -> String { format!("/contacts/{id}") }

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Html<String>, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let contacts = state.store.list().await.map_err(Error::store)?;
  Ok(Html(render::list_page("Contacts", &contacts, user.as_ref())))
}

/// `GET /contacts/mine`. Anonymous visitors are sent to the login page.
pub async fn list_mine<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Response, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let Some(user) = user else {
    return Ok(Redirect::to("/login?redirect=/contacts/mine").into_response());
  };

  let contacts = state
    .store
    .list_created_by(&user.id)
    .await
    .map_err(Error::store)?;
  Ok(Html(render::list_page("My contacts", &contacts, Some(&user))).into_response())
}

/// `GET /contacts/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  CurrentUser(user): CurrentUser,
) -> Result<Html<String>, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let id = parse_id(&raw_id)?;
  let contact = state.store.get(id).await.map_err(Error::store)?;
  Ok(Html(render::detail_page(&contact, user.as_ref())))
}

/// `GET /contacts/add`
pub async fn add_form(CurrentUser(user): CurrentUser) -> Html<String> {
  Html(render::form_page(None, user.as_ref()))
}

/// `GET /contacts/{id}/edit`
pub async fn edit_form<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  CurrentUser(user): CurrentUser,
) -> Result<Html<String>, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let id = parse_id(&raw_id)?;
  let contact = state.store.get(id).await.map_err(Error::store)?;
  Ok(Html(render::form_page(Some(&contact), user.as_ref())))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Form(form): Form<ContactForm>,
) -> Result<Redirect, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let contact = form.into_contact(user.as_ref());
  let id = state.store.add(contact).await.map_err(Error::store)?;
  tracing::info!(%id, "contact created");
  Ok(Redirect::to(&detail_location(id)))
}

/// `PUT /contacts/{id}`
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  CurrentUser(user): CurrentUser,
  Form(form): Form<ContactForm>,
) -> Result<Redirect, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let id = parse_id(&raw_id)?;
  update(&state, id, form, user.as_ref()).await
}

/// `POST /contacts/{id}` updates; `POST /contacts/{id}:delete` deletes.
///
/// Both share one route because the delete marker lives inside the path
/// segment. The delete variant carries no form body.
pub async fn post_to_contact<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
  CurrentUser(user): CurrentUser,
  form: Result<Form<ContactForm>, FormRejection>,
) -> Result<Redirect, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  if let Some(raw_id) = raw.strip_suffix(DELETE_SUFFIX) {
    let id = parse_id(raw_id)?;
    state.store.delete(id).await.map_err(Error::store)?;
    tracing::info!(%id, "contact deleted");
    return Ok(Redirect::to("/contacts"));
  }

  let id = parse_id(&raw)?;
  let Form(form) = form.map_err(|e| Error::BadRequest(e.body_text()))?;
  update(&state, id, form, user.as_ref()).await
}

async fn update<S>(
  state: &AppState<S>,
  id: ContactId,
  form: ContactForm,
  user: Option<&Profile>,
) -> Result<Redirect, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  let contact = Contact {
    id,
    ..form.into_contact(user)
  };
  state.store.update(contact).await.map_err(Error::store)?;
  tracing::info!(%id, "contact updated");
  Ok(Redirect::to(&detail_location(id)))
}
