//! [`MemoryStore`]: an in-process [`ContactStore`] for tests and demos.
//!
//! Nothing is persisted. Ids come from a counter and are never reused, even
//! after deletes, mirroring an auto-increment primary key.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

use crate::{
  Error, Result,
  contact::{Contact, ContactId},
  store::{ContactStore, check_affected, require_assigned},
};

#[derive(Debug, Default)]
struct Inner {
  contacts: BTreeMap<ContactId, Contact>,
  last_id:  i64,
}

/// A contact store held entirely in memory.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  // The map is never left half-written, so a poisoned lock is still usable.
  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn sorted(mut contacts: Vec<Contact>) -> Vec<Contact> {
    contacts.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    contacts
  }
}

impl ContactStore for MemoryStore {
  type Error = Error;

  async fn list(&self) -> Result<Vec<Contact>> {
    let all = self.lock().contacts.values().cloned().collect();
    Ok(Self::sorted(all))
  }

  async fn list_created_by(&self, owner_id: &str) -> Result<Vec<Contact>> {
    if owner_id.is_empty() {
      return self.list().await;
    }
    let owned = self
      .lock()
      .contacts
      .values()
      .filter(|c| c.created_by_id == owner_id)
      .cloned()
      .collect();
    Ok(Self::sorted(owned))
  }

  async fn get(&self, id: ContactId) -> Result<Contact> {
    self.lock().contacts.get(&id).cloned().ok_or(Error::NotFound(id))
  }

  async fn add(&self, mut contact: Contact) -> Result<ContactId> {
    let mut inner = self.lock();
    inner.last_id += 1;
    let id = ContactId(inner.last_id);
    let now = Utc::now();
    contact.id = id;
    contact.created_at = Some(now);
    contact.last_edited = Some(now);
    inner.contacts.insert(id, contact);
    Ok(id)
  }

  async fn update(&self, contact: Contact) -> Result<()> {
    let id = contact.id;
    require_assigned(id, "update")?;
    let mut inner = self.lock();
    let rows = match inner.contacts.get_mut(&id) {
      Some(stored) => {
        *stored = Contact {
          created_at: stored.created_at,
          last_edited: Some(Utc::now()),
          ..contact
        };
        1
      }
      None => 0,
    };
    check_affected(id, rows)
  }

  async fn delete(&self, id: ContactId) -> Result<()> {
    require_assigned(id, "delete")?;
    let rows = usize::from(self.lock().contacts.remove(&id).is_some());
    check_affected(id, rows)
  }

  async fn count(&self) -> Result<u64> {
    Ok(self.lock().contacts.len() as u64)
  }

  async fn find_by_name(&self, first: &str, last: &str) -> Result<Vec<Contact>> {
    // BTreeMap iteration is already in id order.
    Ok(
      self
        .lock()
        .contacts
        .values()
        .filter(|c| c.first_name == first && c.last_name == last)
        .cloned()
        .collect(),
    )
  }

  async fn close(&self) -> Result<()> { Ok(()) }
}
