//! Encoding and decoding helpers between [`Contact`] and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Text columns are nullable;
//! NULL decodes to the empty string.

use chrono::{DateTime, Utc};
use yum_core::{Contact, ContactId};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contacts` row.
///
/// Built inside the connection closure (where only `rusqlite` errors can be
/// raised) and decoded afterwards.
pub struct RawContact {
  pub id:            i64,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub address:       Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub created_by:    Option<String>,
  pub created_by_id: Option<String>,
  pub created_at:    Option<String>,
  pub last_edited:   Option<String>,
}

impl RawContact {
  /// Read a row selected with the column order used by every statement in
  /// [`crate::store`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      address:       row.get(3)?,
      email:         row.get(4)?,
      phone:         row.get(5)?,
      created_by:    row.get(6)?,
      created_by_id: row.get(7)?,
      created_at:    row.get(8)?,
      last_edited:   row.get(9)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:            ContactId(self.id),
      first_name:    self.first_name.unwrap_or_default(),
      last_name:     self.last_name.unwrap_or_default(),
      address:       self.address.unwrap_or_default(),
      email:         self.email.unwrap_or_default(),
      phone:         self.phone.unwrap_or_default(),
      created_by:    self.created_by.unwrap_or_default(),
      created_by_id: self.created_by_id.unwrap_or_default(),
      created_at:    self.created_at.as_deref().map(decode_dt).transpose()?,
      last_edited:   self.last_edited.as_deref().map(decode_dt).transpose()?,
    })
  }
}
