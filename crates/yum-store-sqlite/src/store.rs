//! [`SqliteStore`], the SQLite implementation of [`ContactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use yum_core::{
  Contact, ContactId,
  store::{ContactStore, check_affected, require_assigned},
};

use crate::{
  Error, Result,
  encode::{RawContact, encode_dt},
  schema::SCHEMA,
};

// ─── Statements ──────────────────────────────────────────────────────────────
//
// Each is prepared once per connection via `prepare_cached`. Every SELECT uses
// the column order expected by `RawContact::from_row`.

const LIST: &str = "
  SELECT id, first_name, last_name, address, email, phone,
         created_by, created_by_id, created_at, last_edited
  FROM contacts
  ORDER BY last_name, first_name, id";

const LIST_BY: &str = "
  SELECT id, first_name, last_name, address, email, phone,
         created_by, created_by_id, created_at, last_edited
  FROM contacts
  WHERE created_by_id = ?1
  ORDER BY last_name, first_name, id";

const GET: &str = "
  SELECT id, first_name, last_name, address, email, phone,
         created_by, created_by_id, created_at, last_edited
  FROM contacts
  WHERE id = ?1";

const FIND_BY_NAME: &str = "
  SELECT id, first_name, last_name, address, email, phone,
         created_by, created_by_id, created_at, last_edited
  FROM contacts
  WHERE first_name = ?1 AND last_name = ?2
  ORDER BY id";

const INSERT: &str = "
  INSERT INTO contacts (
    first_name, last_name, address, email, phone,
    created_by, created_by_id, created_at, last_edited
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)";

const UPDATE: &str = "
  UPDATE contacts
  SET first_name = ?1, last_name = ?2, address = ?3, email = ?4, phone = ?5,
      created_by = ?6, created_by_id = ?7, last_edited = ?8
  WHERE id = ?9";

const DELETE: &str = "DELETE FROM contacts WHERE id = ?1";

const COUNT: &str = "SELECT COUNT(*) FROM contacts";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite contact store");
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection {
    &self.conn
  }

  /// Run a contact-returning SELECT with text parameters.
  async fn query(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

/// Convert a `COUNT(*)` result, rejecting values SQLite should never return.
pub(crate) fn row_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Corrupt(format!("negative row count {n}")))
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn list(&self) -> Result<Vec<Contact>> {
    self.query(LIST, Vec::new()).await
  }

  async fn list_created_by(&self, owner_id: &str) -> Result<Vec<Contact>> {
    if owner_id.is_empty() {
      return self.list().await;
    }
    self.query(LIST_BY, vec![owner_id.to_owned()]).await
  }

  async fn get(&self, id: ContactId) -> Result<Contact> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .prepare_cached(GET)?
            .query_row(rusqlite::params![id.0], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(yum_core::Error::NotFound(id)))?
      .into_contact()
  }

  async fn add(&self, contact: Contact) -> Result<ContactId> {
    let now_str = encode_dt(Utc::now());

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.prepare_cached(INSERT)?.execute(rusqlite::params![
          contact.first_name,
          contact.last_name,
          contact.address,
          contact.email,
          contact.phone,
          contact.created_by,
          contact.created_by_id,
          now_str,
        ])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ContactId(id))
  }

  async fn update(&self, contact: Contact) -> Result<()> {
    let id = contact.id;
    require_assigned(id, "update")?;
    let now_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.prepare_cached(UPDATE)?.execute(rusqlite::params![
          contact.first_name,
          contact.last_name,
          contact.address,
          contact.email,
          contact.phone,
          contact.created_by,
          contact.created_by_id,
          now_str,
          id.0,
        ])?)
      })
      .await?;

    Ok(check_affected(id, rows)?)
  }

  async fn delete(&self, id: ContactId) -> Result<()> {
    require_assigned(id, "delete")?;

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.prepare_cached(DELETE)?.execute(rusqlite::params![id.0])?)
      })
      .await?;

    Ok(check_affected(id, rows)?)
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.prepare_cached(COUNT)?.query_row([], |row| row.get(0))?)
      })
      .await?;

    row_count(n)
  }

  async fn find_by_name(&self, first: &str, last: &str) -> Result<Vec<Contact>> {
    self
      .query(FIND_BY_NAME, vec![first.to_owned(), last.to_owned()])
      .await
  }

  async fn close(&self) -> Result<()> {
    // Closing an already-closed connection is a no-op in tokio-rusqlite.
    self.conn.clone().close().await?;
    tracing::debug!("closed sqlite contact store");
    Ok(())
  }
}
