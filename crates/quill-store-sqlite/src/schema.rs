//! SQL schema for the Quill SQLite store.
//!
//! Schema evolution is append-only: `MIGRATIONS` is an ordered list of
//! DDL batches applied linearly, gated on `PRAGMA user_version`. A
//! migration is never edited after it ships; changes go in a new entry.

/// Version 1 — the initial schema.
///
/// Posts own their tagging and comment rows; both carry
/// `ON DELETE CASCADE`, and the repository additionally deletes them
/// explicitly inside the delete transaction.
const V1_INITIAL: &str = "
CREATE TABLE users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,    -- 'user' | 'moderator' | 'administrator'
    member_since  TEXT NOT NULL     -- ISO 8601 UTC
);

CREATE TABLE categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE       -- stored lower-cased
);

CREATE TABLE posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    body        TEXT NOT NULL,
    timestamp   TEXT NOT NULL,
    last_edit   TEXT,
    author_id   INTEGER NOT NULL REFERENCES users(id),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    thumb_up    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE tags (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE       -- stored lower-cased
);

-- One row per (post, tag) pair; timestamp orders 'recent tag use'.
CREATE TABLE tagging (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag_id    INTEGER NOT NULL REFERENCES tags(id),
    timestamp TEXT NOT NULL,
    UNIQUE (post_id, tag_id)
);

CREATE TABLE comments (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    body      TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(id),
    post_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE
);

CREATE TABLE messages (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT NOT NULL,
    body      TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE INDEX posts_timestamp_idx    ON posts(timestamp);
CREATE INDEX posts_category_idx     ON posts(category_id);
CREATE INDEX tagging_post_idx       ON tagging(post_id);
CREATE INDEX tagging_tag_idx        ON tagging(tag_id);
CREATE INDEX comments_post_idx      ON comments(post_id);
CREATE INDEX comments_timestamp_idx ON comments(timestamp);
";

/// Version 2 — comment threading.
const V2_COMMENT_PARENT: &str = "
ALTER TABLE comments ADD COLUMN parent_id INTEGER REFERENCES comments(id);
";

/// All migrations, in the order they are applied.
pub const MIGRATIONS: &[&str] = &[V1_INITIAL, V2_COMMENT_PARENT];

/// Bring `conn` up to the latest schema version.
pub fn migrate(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
  let version: i64 =
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

  for (index, batch) in MIGRATIONS.iter().enumerate().skip(version as usize) {
    let tx = conn.transaction()?;
    tx.execute_batch(batch)?;
    tx.pragma_update(None, "user_version", (index + 1) as i64)?;
    tx.commit()?;
  }
  Ok(())
}
