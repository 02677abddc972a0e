//! The `ContactStore` trait and helpers shared by its implementations.
//!
//! The trait is implemented by storage backends (`yum-store-sqlite`, and the
//! in-memory [`MemoryStore`](crate::memory::MemoryStore)). Higher layers
//! (`yum-web`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  Error, Result, StoreError,
  contact::{Contact, ContactId},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a contact store backend.
///
/// Implementations must be safe for concurrent callers; how that is achieved
/// (a dedicated connection thread, a mutex, a pool) is up to the backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: StoreError;

  /// All contacts ordered by last name, then first name.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Contacts whose `created_by_id` equals `owner_id`, ordered like
  /// [`list`](Self::list). An empty `owner_id` means "no filter".
  fn list_created_by<'a>(
    &'a self,
    owner_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Retrieve a contact by id. Fails with [`Error::NotFound`] if absent.
  fn get(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Persist a new contact and return its freshly assigned id.
  ///
  /// Any id already present on `contact` is ignored. `created_at` and
  /// `last_edited` are set by the store.
  fn add(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<ContactId, Self::Error>> + Send + '_;

  /// Overwrite the descriptive and creator fields of an existing contact.
  ///
  /// `contact.id` must be assigned and must match exactly one stored record.
  /// `created_at` is preserved; `last_edited` is refreshed.
  fn update(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Hard-delete a contact. `id` must be assigned and match exactly one record.
  fn delete(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Total number of stored contacts.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Contacts whose first and last names match exactly (case-sensitive),
  /// ordered by id. All matches are returned.
  fn find_by_name<'a>(
    &'a self,
    first: &'a str,
    last: &'a str,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Release any held resources. Calling it more than once is harmless.
  fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Shared guards ───────────────────────────────────────────────────────────

/// Reject the unassigned id before a mutation touches storage.
pub fn require_assigned(id: ContactId, operation: &str) -> Result<()> {
  if id.is_assigned() {
    Ok(())
  } else {
    Err(Error::InvalidArgument(format!(
      "contact with unassigned id passed to {operation}"
    )))
  }
}

/// Post-condition for `update` and `delete`: exactly one record must have been
/// affected. Zero means the id does not exist.
pub fn check_affected(id: ContactId, rows: usize) -> Result<()> {
  match rows {
    1 => Ok(()),
    0 => Err(Error::NotFound(id)),
    rows => Err(Error::UnexpectedRowCount { id, rows }),
  }
}
