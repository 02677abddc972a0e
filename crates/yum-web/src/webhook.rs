//! Assistant fulfillment webhook (`POST /contactsWebhook`).
//!
//! The assistant framework classifies an utterance into an intent, fills
//! named parameters, and posts them here. We answer with text to speak and
//! display. Payloads follow the API.AI v1 fulfillment format.

use std::collections::HashMap;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::HeaderMap,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use yum_core::{Contact, store::ContactStore};

use crate::{AppState, auth::verify_basic, error::Error};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Incoming fulfillment request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookRequest {
  pub id:               String,
  pub timestamp:        Option<DateTime<Utc>>,
  pub result:           QueryResult,
  pub status:           RequestStatus,
  pub session_id:       String,
  pub original_request: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
  pub resolved_query: String,
  /// Slot values keyed by parameter name. Usually strings, but the framework
  /// may send lists or numbers.
  pub parameters:     HashMap<String, Value>,
  pub contexts:       Vec<Value>,
  pub metadata:       IntentMetadata,
  pub score:          f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentMetadata {
  pub intent_id:                     String,
  pub intent_name:                   String,
  pub webhook_used:                  String,
  pub webhook_for_slot_filling_used: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestStatus {
  pub code:       u16,
  pub error_type: String,
}

impl WebhookRequest {
  /// A parameter as plain text; missing or null parameters are empty.
  pub fn param(&self, name: &str) -> String {
    match self.result.parameters.get(name) {
      None | Some(Value::Null) => String::new(),
      Some(Value::String(s)) => s.trim().to_owned(),
      Some(Value::Array(items)) => items
        .iter()
        .find_map(Value::as_str)
        .map(|s| s.trim().to_owned())
        .unwrap_or_default(),
      Some(other) => other.to_string(),
    }
  }

  /// The contact fields carried in the request's parameters.
  pub fn contact_params(&self) -> ContactParams {
    ContactParams {
      given_name: self.param("given-name"),
      last_name:  self.param("last-name"),
      address:    self.param("address"),
      email:      self.param("email"),
      phone:      self.param("phone-number"),
    }
  }
}

/// Partial contact projected from request parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContactParams {
  pub given_name: String,
  pub last_name:  String,
  pub address:    String,
  pub email:      String,
  pub phone:      String,
}

impl ContactParams {
  fn has_name(&self) -> bool {
    !self.given_name.is_empty() || !self.last_name.is_empty()
  }

  fn display_name(&self) -> String {
    format!("{} {}", self.given_name, self.last_name).trim().to_owned()
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
  pub speech:       String,
  pub display_text: String,
  pub source:       String,
}

// ─── Intents ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
  NumberOfContacts,
  FindContact,
  AddContact,
  UpdateContact,
  DeleteContact,
  Unhandled(String),
}

impl Intent {
  pub fn from_name(name: &str) -> Self {
    match name {
      "number_of_contacts" => Self::NumberOfContacts,
      "find_contact" => Self::FindContact,
      "add_contact" => Self::AddContact,
      "update_contact" => Self::UpdateContact,
      "delete_contact" => Self::DeleteContact,
      other => Self::Unhandled(other.to_owned()),
    }
  }
}

const ASK_FOR_NAME: &str = "Which contact? Please tell me a first and last name.";

/// Run the request's intent against `store` and return the text to speak.
pub async fn dispatch<S: ContactStore>(
  store: &S,
  request: &WebhookRequest,
) -> Result<String, S::Error> {
  let params = request.contact_params();
  tracing::debug!(?params, intent = %request.result.metadata.intent_name, "webhook request");

  match Intent::from_name(&request.result.metadata.intent_name) {
    Intent::NumberOfContacts => tally(store).await,
    Intent::FindContact => find(store, &params).await,
    Intent::AddContact => add(store, &params).await,
    Intent::UpdateContact => update(store, &params).await,
    Intent::DeleteContact => delete(store, &params).await,
    Intent::Unhandled(name) => {
      tracing::info!(intent = %name, "unhandled webhook intent");
      Ok(format!("Sorry, I can't help with \"{name}\" yet."))
    }
  }
}

async fn tally<S: ContactStore>(store: &S) -> Result<String, S::Error> {
  let n = store.count().await?;
  Ok(match n {
    1 => "You have 1 contact.".to_owned(),
    n => format!("You have {n} contacts."),
  })
}

fn describe(c: &Contact) -> String {
  format!(
    "{} at address: {}, with phone number: {} and email: {}",
    c.full_name(),
    c.address,
    c.phone,
    c.email,
  )
}

fn no_match(p: &ContactParams) -> String {
  format!(
    "No contact found for first name {}, last name {}.",
    p.given_name, p.last_name
  )
}

fn ambiguous(p: &ContactParams, n: usize) -> String {
  format!(
    "There are {n} contacts named {}. I can only change one at a time.",
    p.display_name()
  )
}

async fn find<S: ContactStore>(
  store: &S,
  p: &ContactParams,
) -> Result<String, S::Error> {
  if !p.has_name() {
    return Ok(ASK_FOR_NAME.to_owned());
  }
  let found = store.find_by_name(&p.given_name, &p.last_name).await?;
  Ok(match found.as_slice() {
    [] => no_match(p),
    [only] => format!("Found: {}", describe(only)),
    [first, _] => format!("Found: {}. 1 more contact shares that name.", describe(first)),
    [first, rest @ ..] => format!(
      "Found: {}. {} more contacts share that name.",
      describe(first),
      rest.len()
    ),
  })
}

async fn add<S: ContactStore>(
  store: &S,
  p: &ContactParams,
) -> Result<String, S::Error> {
  if !p.has_name() {
    return Ok("I need at least a first or last name to add a contact.".to_owned());
  }
  let mut contact = Contact {
    address: p.address.clone(),
    email: p.email.clone(),
    phone: p.phone.clone(),
    ..Contact::new(p.given_name.clone(), p.last_name.clone())
  };
  contact.set_creator_anonymous();

  let id = store.add(contact).await?;
  tracing::info!(%id, "contact created via webhook");
  Ok(format!("Added {} as contact number {id}.", p.display_name()))
}

/// Overwrite the contact's fields with every non-empty parameter.
fn apply(contact: &mut Contact, p: &ContactParams) {
  for (field, value) in [
    (&mut contact.address, &p.address),
    (&mut contact.email, &p.email),
    (&mut contact.phone, &p.phone),
  ] {
    if !value.is_empty() {
      field.clone_from(value);
    }
  }
}

async fn update<S: ContactStore>(
  store: &S,
  p: &ContactParams,
) -> Result<String, S::Error> {
  if !p.has_name() {
    return Ok(ASK_FOR_NAME.to_owned());
  }
  let mut found = store.find_by_name(&p.given_name, &p.last_name).await?;
  match found.len() {
    0 => Ok(no_match(p)),
    1 => {
      let mut contact = found.remove(0);
      apply(&mut contact, p);
      let id = contact.id;
      store.update(contact).await?;
      tracing::info!(%id, "contact updated via webhook");
      Ok(format!("Updated {}.", p.display_name()))
    }
    n => Ok(ambiguous(p, n)),
  }
}

async fn delete<S: ContactStore>(
  store: &S,
  p: &ContactParams,
) -> Result<String, S::Error> {
  if !p.has_name() {
    return Ok(ASK_FOR_NAME.to_owned());
  }
  let found = store.find_by_name(&p.given_name, &p.last_name).await?;
  match found.as_slice() {
    [] => Ok(no_match(p)),
    [only] => {
      store.delete(only.id).await?;
      tracing::info!(id = %only.id, "contact deleted via webhook");
      Ok(format!("Deleted {}.", p.display_name()))
    }
    many => Ok(ambiguous(p, many.len())),
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /contactsWebhook`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<Json<WebhookResponse>, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  if let Some(auth) = &state.config.webhook_auth {
    verify_basic(&headers, auth)?;
  }

  let Json(request) = body.map_err(|e| Error::Decode(e.body_text()))?;
  let speech = dispatch(state.store.as_ref(), &request)
    .await
    .map_err(Error::store)?;

  Ok(Json(WebhookResponse {
    display_text: speech.clone(),
    speech,
    source: state.config.webhook_source.clone(),
  }))
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use yum_core::{ContactId, memory::MemoryStore};

  use super::*;

  fn request(intent: &str, params: Value) -> WebhookRequest {
    serde_json::from_value(json!({
      "id": "req-1",
      "timestamp": "2017-08-21T12:00:00Z",
      "sessionId": "s-1",
      "result": {
        "parameters": params,
        "contexts": [],
        "metadata": { "intentId": "i-1", "intentName": intent },
        "score": 1.0
      },
      "status": { "code": 200, "errorType": "success" }
    }))
    .unwrap()
  }

  fn homer_params() -> Value {
    json!({ "given-name": "Homer", "last-name": "Simpson" })
  }

  async fn store_with_homer() -> MemoryStore {
    let store = MemoryStore::new();
    store
      .add(Contact {
        address: "742 Evergreen Terrace".into(),
        phone: "555-1234".into(),
        email: "homer@example.com".into(),
        ..Contact::new("Homer", "Simpson")
      })
      .await
      .unwrap();
    store
  }

  #[test]
  fn decodes_full_payload() {
    let r = request("find_contact", homer_params());
    assert_eq!(r.session_id, "s-1");
    assert_eq!(r.result.metadata.intent_name, "find_contact");
    assert_eq!(r.status.code, 200);
    assert!(r.timestamp.is_some());
  }

  #[test]
  fn extracts_contact_params() {
    let r = request(
      "add_contact",
      json!({
        "given-name": " Homer ",
        "last-name": "Simpson",
        "address": ["742 Evergreen Terrace"],
        "email": null,
        "phone-number": 5551234
      }),
    );
    assert_eq!(r.contact_params(), ContactParams {
      given_name: "Homer".into(),
      last_name:  "Simpson".into(),
      address:    "742 Evergreen Terrace".into(),
      email:      String::new(),
      phone:      "5551234".into(),
    });
  }

  #[test]
  fn intent_names() {
    assert_eq!(Intent::from_name("number_of_contacts"), Intent::NumberOfContacts);
    assert_eq!(Intent::from_name("delete_contact"), Intent::DeleteContact);
    assert_eq!(
      Intent::from_name("small_talk"),
      Intent::Unhandled("small_talk".into())
    );
  }

  #[tokio::test]
  async fn tally_counts_contacts() {
    let store = store_with_homer().await;
    let speech = dispatch(&store, &request("number_of_contacts", json!({})))
      .await
      .unwrap();
    assert_eq!(speech, "You have 1 contact.");
  }

  #[tokio::test]
  async fn find_describes_match() {
    let store = store_with_homer().await;
    let speech = dispatch(&store, &request("find_contact", homer_params()))
      .await
      .unwrap();
    assert!(speech.starts_with("Found: Homer Simpson"), "{speech}");
    assert!(speech.contains("555-1234"));
  }

  #[tokio::test]
  async fn find_reports_missing_and_extra_matches() {
    let store = store_with_homer().await;
    let none = dispatch(
      &store,
      &request("find_contact", json!({ "given-name": "Ned", "last-name": "Flanders" })),
    )
    .await
    .unwrap();
    assert!(none.starts_with("No contact found"), "{none}");

    store.add(Contact::new("Homer", "Simpson")).await.unwrap();
    let many = dispatch(&store, &request("find_contact", homer_params()))
      .await
      .unwrap();
    assert!(many.contains("1 more contact shares that name"), "{many}");

    store.add(Contact::new("Homer", "Simpson")).await.unwrap();
    let more = dispatch(&store, &request("find_contact", homer_params()))
      .await
      .unwrap();
    assert!(more.contains("2 more contacts share that name"), "{more}");
  }

  #[tokio::test]
  async fn add_creates_anonymous_contact() {
    let store = MemoryStore::new();
    let speech = dispatch(
      &store,
      &request(
        "add_contact",
        json!({ "given-name": "Ned", "last-name": "Flanders", "phone-number": "555-0101" }),
      ),
    )
    .await
    .unwrap();
    assert_eq!(speech, "Added Ned Flanders as contact number 1.");

    let ned = store.get(ContactId(1)).await.unwrap();
    assert_eq!(ned.phone, "555-0101");
    assert!(ned.is_anonymous());
  }

  #[tokio::test]
  async fn add_requires_a_name() {
    let store = MemoryStore::new();
    let speech = dispatch(&store, &request("add_contact", json!({})))
      .await
      .unwrap();
    assert!(speech.contains("need at least"));
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn update_overwrites_only_given_fields() {
    let store = store_with_homer().await;
    let mut params = homer_params();
    params["phone-number"] = json!("555-0000");
    let speech = dispatch(&store, &request("update_contact", params))
      .await
      .unwrap();
    assert_eq!(speech, "Updated Homer Simpson.");

    let homer = store.get(ContactId(1)).await.unwrap();
    assert_eq!(homer.phone, "555-0000");
    assert_eq!(homer.address, "742 Evergreen Terrace");
  }

  #[tokio::test]
  async fn update_refuses_ambiguous_names() {
    let store = store_with_homer().await;
    store.add(Contact::new("Homer", "Simpson")).await.unwrap();
    let before = store.list().await.unwrap();

    let mut params = homer_params();
    params["phone-number"] = json!("555-0000");
    let speech = dispatch(&store, &request("update_contact", params))
      .await
      .unwrap();
    assert_eq!(
      speech,
      "There are 2 contacts named Homer Simpson. I can only change one at a time."
    );
    assert_eq!(store.list().await.unwrap(), before);
  }

  #[tokio::test]
  async fn update_reports_missing_contact() {
    let store = store_with_homer().await;
    let before = store.list().await.unwrap();

    let speech = dispatch(
      &store,
      &request(
        "update_contact",
        json!({ "given-name": "Ned", "last-name": "Flanders", "phone-number": "555-0101" }),
      ),
    )
    .await
    .unwrap();
    assert_eq!(speech, "No contact found for first name Ned, last name Flanders.");
    assert_eq!(store.list().await.unwrap(), before);
  }

  #[tokio::test]
  async fn delete_refuses_ambiguous_names() {
    let store = store_with_homer().await;
    store.add(Contact::new("Homer", "Simpson")).await.unwrap();

    let speech = dispatch(&store, &request("delete_contact", homer_params()))
      .await
      .unwrap();
    assert!(speech.starts_with("There are 2 contacts"), "{speech}");
    assert_eq!(store.count().await.unwrap(), 2);
  }

  #[tokio::test]
  async fn delete_removes_single_match() {
    let store = store_with_homer().await;
    let speech = dispatch(&store, &request("delete_contact", homer_params()))
      .await
      .unwrap();
    assert_eq!(speech, "Deleted Homer Simpson.");
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn unknown_intent_is_reported() {
    let store = MemoryStore::new();
    let speech = dispatch(&store, &request("order_pizza", json!({})))
      .await
      .unwrap();
    assert!(speech.contains("order_pizza"));
  }
}
