//! Server-side HTML pages.
//!
//! Pages are assembled from string fragments; every piece of user-supplied
//! text goes through [`esc`] before it reaches the markup.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use yum_core::Contact;

use crate::session::Profile;

fn esc(s: &str) -> Cow<'_, str> { escape(s) }

fn timestamp(dt: Option<DateTime<Utc>>) -> String {
  dt.map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
    .unwrap_or_default()
}

fn layout(title: &str, user: Option<&Profile>, body: &str) -> String {
  let account = match user {
    Some(p) => format!(
      r#"<form method="post" action="/logout" class="logout">
      <span>Signed in as {name}</span> <button type="submit">Log out</button>
    </form>"#,
      name = esc(&p.display_name),
    ),
    None => r#"<a href="/login">Log in</a>"#.to_owned(),
  };

  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} - Contacts</title>
</head>
<body>
  <nav>
    <a href="/contacts">Contacts</a>
    <a href="/contacts/mine">My contacts</a>
    <a href="/contacts/add">Add contact</a>
    {account}
  </nav>
  <main>
    <h1>{title}</h1>
{body}
  </main>
</body>
</html>
"#,
    title = esc(title),
  )
}

// ─── Pages ───────────────────────────────────────────────────────────────────

pub fn list_page(title: &str, contacts: &[Contact], user: Option<&Profile>) -> String {
  if contacts.is_empty() {
    return layout(title, user, "    <p>No contacts found.</p>");
  }

  let rows: String = contacts
    .iter()
    .map(|c| {
      format!(
        r#"      <tr>
        <td><a href="/contacts/{id}">{name}</a></td>
        <td>{email}</td>
        <td>{phone}</td>
      </tr>
"#,
        id = c.id,
        name = esc(&c.full_name()),
        email = esc(&c.email),
        phone = esc(&c.phone),
      )
    })
    .collect();

  let body = format!(
    r#"    <table>
      <tr><th>Name</th><th>Email</th><th>Phone</th></tr>
{rows}    </table>"#
  );
  layout(title, user, &body)
}

pub fn detail_page(contact: &Contact, user: Option<&Profile>) -> String {
  let body = format!(
    r#"    <dl>
      <dt>First name</dt><dd>{first}</dd>
      <dt>Last name</dt><dd>{last}</dd>
      <dt>Address</dt><dd>{address}</dd>
      <dt>Email</dt><dd>{email}</dd>
      <dt>Phone</dt><dd>{phone}</dd>
      <dt>Added by</dt><dd>{creator}</dd>
      <dt>Created</dt><dd>{created}</dd>
      <dt>Last edited</dt><dd>{edited}</dd>
    </dl>
    <a href="/contacts/{id}/edit">Edit</a>
    <form method="post" action="/contacts/{id}:delete">
      <button type="submit">Delete</button>
    </form>"#,
    id = contact.id,
    first = esc(&contact.first_name),
    last = esc(&contact.last_name),
    address = esc(&contact.address),
    email = esc(&contact.email),
    phone = esc(&contact.phone),
    creator = esc(contact.created_by_display_name()),
    created = timestamp(contact.created_at),
    edited = timestamp(contact.last_edited),
  );
  layout(&contact.full_name(), user, &body)
}

/// The add form when `contact` is `None`, otherwise the edit form.
pub fn form_page(contact: Option<&Contact>, user: Option<&Profile>) -> String {
  let (title, action) = match contact {
    Some(c) => ("Edit contact", format!("/contacts/{}", c.id)),
    None => ("Add contact", "/contacts".to_owned()),
  };
  let blank = Contact::default();
  let c = contact.unwrap_or(&blank);

  let field = |label: &str, name: &str, value: &str| {
    format!(
      r#"      <label>{label} <input name="{name}" value="{value}"></label><br>
"#,
      value = esc(value),
    )
  };

  let body = format!(
    r#"    <form method="post" action="{action}">
{first}{last}{address}{email}{phone}      <input type="hidden" name="createdBy" value="{created_by}">
      <input type="hidden" name="createdByID" value="{created_by_id}">
      <button type="submit">Save</button>
    </form>"#,
    first = field("First name", "firstname", &c.first_name),
    last = field("Last name", "lastname", &c.last_name),
    address = field("Address", "address", &c.address),
    email = field("Email", "email", &c.email),
    phone = field("Phone", "phone", &c.phone),
    created_by = esc(&c.created_by),
    created_by_id = esc(&c.created_by_id),
  );
  layout(title, user, &body)
}

pub fn login_page(redirect: &str, error: Option<&str>) -> String {
  let error = error
    .map(|e| format!("    <p class=\"error\">{}</p>\n", esc(e)))
    .unwrap_or_default();
  let body = format!(
    r#"{error}    <form method="post" action="/login">
      <label>Username <input name="username"></label><br>
      <label>Password <input name="password" type="password"></label><br>
      <input type="hidden" name="redirect" value="{redirect}">
      <button type="submit">Log in</button>
    </form>"#,
    redirect = esc(redirect),
  );
  layout("Log in", None, &body)
}
