//! Integration tests for `SqliteStore` against an in-memory database.

use yum_core::{
  Contact, ContactId, ErrorKind, StoreError as _, store::ContactStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn homer() -> Contact {
  Contact {
    address: "742 Evergreen Terrace, Springfield".into(),
    email: "homer.simpson@simpsons.guru".into(),
    phone: "555-123-4567".into(),
    created_by: "Marge".into(),
    created_by_id: "marge".into(),
    ..Contact::new("Homer", "Simpson")
  }
}

fn without_store_fields(c: Contact) -> Contact {
  Contact {
    id: ContactId::UNASSIGNED,
    created_at: None,
    last_edited: None,
    ..c
  }
}

// ─── Add / get ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_contact() {
  let s = store().await;

  let id = s.add(homer()).await.unwrap();
  assert_eq!(id, ContactId(1));

  let fetched = s.get(id).await.unwrap();
  assert_eq!(fetched.id, id);
  assert!(fetched.created_at.is_some());
  assert_eq!(fetched.created_at, fetched.last_edited);
  assert_eq!(without_store_fields(fetched), homer());
}

#[tokio::test]
async fn add_ignores_caller_supplied_id() {
  let s = store().await;
  let id = s
    .add(Contact { id: ContactId(42), ..homer() })
    .await
    .unwrap();
  assert_eq!(id, ContactId(1));

  let second = s.add(homer()).await.unwrap();
  assert_eq!(second, ContactId(2));
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let s = store().await;
  let err = s.get(ContactId(7)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yum_core::Error::NotFound(ContactId(7)))
  ));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn null_columns_read_back_as_empty() {
  let s = store().await;
  s.conn_for_tests()
    .call(|conn| {
      conn.execute(
        "INSERT INTO contacts (first_name, created_at) VALUES ('Ned', ?1)",
        ["2017-08-21T00:00:00+00:00"],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let ned = s.get(ContactId(1)).await.unwrap();
  assert_eq!(ned.first_name, "Ned");
  assert_eq!(ned.last_name, "");
  assert_eq!(ned.phone, "");
  assert!(ned.last_edited.is_none());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_empty_store_is_empty() {
  let s = store().await;
  assert!(s.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_by_last_then_first_name() {
  let s = store().await;
  for (first, last) in [
    ("Lisa", "Simpson"),
    ("Ned", "Flanders"),
    ("Bart", "Simpson"),
    ("Maude", "Flanders"),
  ] {
    s.add(Contact::new(first, last)).await.unwrap();
  }

  let names: Vec<String> =
    s.list().await.unwrap().iter().map(Contact::full_name).collect();
  assert_eq!(
    names,
    ["Maude Flanders", "Ned Flanders", "Bart Simpson", "Lisa Simpson"]
  );
}

#[tokio::test]
async fn list_created_by_filters_on_creator_id() {
  let s = store().await;
  s.add(homer()).await.unwrap();
  let mut ned = Contact::new("Ned", "Flanders");
  ned.set_creator_anonymous();
  s.add(ned).await.unwrap();

  let by_marge = s.list_created_by("marge").await.unwrap();
  assert_eq!(by_marge.len(), 1);
  assert_eq!(by_marge[0].first_name, "Homer");

  let anonymous = s.list_created_by("anonymous").await.unwrap();
  assert_eq!(anonymous.len(), 1);
  assert_eq!(anonymous[0].created_by_display_name(), "Anonymous");

  assert!(s.list_created_by("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_created_by_empty_owner_matches_list() {
  let s = store().await;
  s.add(homer()).await.unwrap();
  s.add(Contact::new("Ned", "Flanders")).await.unwrap();

  assert_eq!(
    s.list_created_by("").await.unwrap(),
    s.list().await.unwrap()
  );
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_fields_and_keeps_created_at() {
  let s = store().await;
  let id = s.add(homer()).await.unwrap();
  let before = s.get(id).await.unwrap();

  let edited = Contact {
    phone: "555-0000".into(),
    address: "Moved".into(),
    ..before.clone()
  };
  s.update(edited).await.unwrap();

  let after = s.get(id).await.unwrap();
  assert_eq!(after.phone, "555-0000");
  assert_eq!(after.address, "Moved");
  assert_eq!(after.created_at, before.created_at);
  assert!(after.last_edited >= before.last_edited);
}

#[tokio::test]
async fn update_with_unchanged_values_is_stable() {
  let s = store().await;
  let id = s.add(homer()).await.unwrap();
  let before = s.get(id).await.unwrap();

  s.update(before.clone()).await.unwrap();

  let after = s.get(id).await.unwrap();
  assert_eq!(
    without_store_fields(after.clone()),
    without_store_fields(before.clone())
  );
  assert_eq!(after.id, before.id);
  assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn update_unassigned_id_is_invalid_argument() {
  let s = store().await;
  let err = s.update(homer()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
  let s = store().await;
  let err = s
    .update(Contact { id: ContactId(3), ..homer() })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_contact() {
  let s = store().await;
  let id = s.add(homer()).await.unwrap();
  let keep = s.add(Contact::new("Ned", "Flanders")).await.unwrap();

  s.delete(id).await.unwrap();

  assert_eq!(s.get(id).await.unwrap_err().kind(), ErrorKind::NotFound);
  let remaining: Vec<ContactId> =
    s.list().await.unwrap().iter().map(|c| c.id).collect();
  assert_eq!(remaining, [keep]);
}

#[tokio::test]
async fn delete_guards() {
  let s = store().await;
  assert_eq!(
    s.delete(ContactId::UNASSIGNED).await.unwrap_err().kind(),
    ErrorKind::InvalidArgument
  );
  assert_eq!(
    s.delete(ContactId(9)).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );

  let id = s.add(homer()).await.unwrap();
  s.delete(id).await.unwrap();
  assert_eq!(s.delete(id).await.unwrap_err().kind(), ErrorKind::NotFound);
}

// ─── Count / find ────────────────────────────────────────────────────────────

#[tokio::test]
async fn count_tracks_adds_and_deletes() {
  let s = store().await;
  assert_eq!(s.count().await.unwrap(), 0);
  let id = s.add(homer()).await.unwrap();
  s.add(Contact::new("Ned", "Flanders")).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 2);
  s.delete(id).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 1);
}

#[test]
fn negative_row_count_is_a_backend_error() {
  assert_eq!(crate::store::row_count(3).unwrap(), 3);
  let err = crate::store::row_count(-1).unwrap_err();
  assert!(matches!(err, Error::Corrupt(_)));
  assert_eq!(err.kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn find_by_name_is_exact_and_returns_all_matches() {
  let s = store().await;
  let first = s.add(homer()).await.unwrap();
  s.add(Contact::new("homer", "simpson")).await.unwrap();
  s.add(Contact::new("Homer", "Simpsons")).await.unwrap();
  let second = s.add(Contact::new("Homer", "Simpson")).await.unwrap();

  let found: Vec<ContactId> = s
    .find_by_name("Homer", "Simpson")
    .await
    .unwrap()
    .iter()
    .map(|c| c.id)
    .collect();
  assert_eq!(found, [first, second]);

  assert!(s.find_by_name("Marge", "Simpson").await.unwrap().is_empty());
}

// ─── Scenario ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn homer_lifecycle() {
  let s = store().await;

  let id = s.add(homer()).await.unwrap();
  assert_eq!(id, ContactId(1));
  assert_eq!(without_store_fields(s.get(id).await.unwrap()), homer());

  let mut c = s.get(id).await.unwrap();
  c.phone = "555-0000".into();
  s.update(c).await.unwrap();
  assert_eq!(s.get(id).await.unwrap().phone, "555-0000");

  s.delete(id).await.unwrap();
  assert!(s.get(id).await.is_err());
  assert!(s.list().await.unwrap().iter().all(|c| c.id != id));
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_contacts() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("contacts.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let id = s.add(homer()).await.unwrap();
  s.close().await.unwrap();

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.get(id).await.unwrap().first_name, "Homer");
  reopened.close().await.unwrap();
}

#[tokio::test]
async fn close_is_idempotent() {
  let s = store().await;
  s.close().await.unwrap();
  s.close().await.unwrap();
  assert!(s.list().await.is_err());
}
