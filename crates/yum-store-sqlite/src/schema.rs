//! SQL schema for the yum-contacts SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Every text column is nullable; readers coerce NULL to ''.
CREATE TABLE IF NOT EXISTS contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT,
    last_name     TEXT,
    address       TEXT,
    email         TEXT,
    phone         TEXT,
    created_by    TEXT,
    created_by_id TEXT,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    last_edited   TEXT             -- RFC 3339 UTC; refreshed on update
);

CREATE INDEX IF NOT EXISTS contacts_name_idx    ON contacts(last_name, first_name);
CREATE INDEX IF NOT EXISTS contacts_creator_idx ON contacts(created_by_id);

PRAGMA user_version = 1;
";

