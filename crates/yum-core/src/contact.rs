//! The contact record, the single persisted entity.
//!
//! A contact carries a person's descriptive details plus provenance: who
//! created it and when it was created and last edited. Provenance timestamps
//! are always assigned by the store, never by callers.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `created_by_id` value denoting a contact created without a signed-in
/// user.
pub const ANONYMOUS_CREATOR_ID: &str = "anonymous";

/// Display name shown for anonymously created contacts.
const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

// ─── Identity ────────────────────────────────────────────────────────────────

/// Backend-assigned contact identifier.
///
/// [`ContactId::UNASSIGNED`] (zero) marks a contact that has not been
/// persisted yet; stores reject it for updates and deletes.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl ContactId {
  pub const UNASSIGNED: Self = Self(0);

  pub fn is_assigned(self) -> bool { self != Self::UNASSIGNED }
}

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for ContactId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
}

impl From<i64> for ContactId {
  fn from(id: i64) -> Self { Self(id) }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A person's contact details. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:            ContactId,
  pub first_name:    String,
  pub last_name:     String,
  pub address:       String,
  pub email:         String,
  pub phone:         String,
  /// Display name of the creating user; empty for anonymous creators.
  pub created_by:    String,
  /// Identifier of the creating user, or [`ANONYMOUS_CREATOR_ID`].
  pub created_by_id: String,
  /// Set by the store on insert; never changes afterwards.
  pub created_at:    Option<DateTime<Utc>>,
  /// Set by the store on insert and on every update.
  pub last_edited:   Option<DateTime<Utc>>,
}

impl Contact {
  /// Convenience constructor for a not-yet-persisted contact.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      ..Self::default()
    }
  }

  /// Name of the creating user, suitable for display.
  pub fn created_by_display_name(&self) -> &str {
    if self.is_anonymous() {
      ANONYMOUS_DISPLAY_NAME
    } else {
      &self.created_by
    }
  }

  /// Mark the contact as created by an anonymous user. Clears `created_by`.
  pub fn set_creator_anonymous(&mut self) {
    self.created_by.clear();
    self.created_by_id = ANONYMOUS_CREATOR_ID.to_owned();
  }

  pub fn is_anonymous(&self) -> bool {
    self.created_by_id == ANONYMOUS_CREATOR_ID
  }

  /// `"first last"`, omitting whichever half is empty.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_owned()
  }

  /// The key contacts are listed by: last name, then first name, then id.
  pub fn sort_key(&self) -> (&str, &str, ContactId) {
    (&self.last_name, &self.first_name, self.id)
  }
}
