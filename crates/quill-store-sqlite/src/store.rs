//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};

use quill_core::{
  Error, Result,
  models::{
    Category, Comment, CommentOverview, Message, MessageOverview, NewPost,
    NewUser, Post, PostOverview, PostUpdate, Tag, User,
  },
  page::{Page, PageRequest},
  store::ContentStore,
};

use crate::{
  encode::{
    RawCommentOverview, RawMessageOverview, RawPostOverview, RawUser,
    encode_dt, encode_role,
  },
  schema,
};

// ─── Shared SQL ──────────────────────────────────────────────────────────────

/// Base SELECT for post overview rows; author and category names resolved
/// in the same statement.
const POST_SELECT: &str = "SELECT p.id, p.title, p.body, p.timestamp, p.last_edit,
          u.username, c.name, p.thumb_up
   FROM posts p
   JOIN users u      ON u.id = p.author_id
   JOIN categories c ON c.id = p.category_id";

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn read_post_rows(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<RawPostOverview>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(params, |row| {
      Ok(RawPostOverview {
        id:        row.get(0)?,
        title:     row.get(1)?,
        body:      row.get(2)?,
        timestamp: row.get(3)?,
        last_edit: row.get(4)?,
        author:    row.get(5)?,
        category:  row.get(6)?,
        thumb_up:  row.get(7)?,
      })
    })?
    .collect()
}

fn tag_names_for_post(
  conn: &rusqlite::Connection,
  post_id: i64,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT t.name FROM tagging g
     JOIN tags t ON t.id = g.tag_id
     WHERE g.post_id = ?1
     ORDER BY g.timestamp, g.id",
  )?;
  stmt.query_map(params![post_id], |row| row.get(0))?.collect()
}

fn attach_tag_names(
  conn: &rusqlite::Connection,
  raws: Vec<RawPostOverview>,
) -> rusqlite::Result<Vec<(RawPostOverview, Vec<String>)>> {
  raws
    .into_iter()
    .map(|raw| {
      let tags = tag_names_for_post(conn, raw.id)?;
      Ok((raw, tags))
    })
    .collect()
}

/// Which subset of posts a page query covers.
enum PostFilter {
  All,
  /// Already lower-cased category name.
  Category(String),
  /// Exact tag name.
  Tag(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quill content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// calls are serialised onto one connection thread, which is what makes
/// the relative `UPDATE` in [`ContentStore::increment_thumb`] lose no
/// updates under concurrent callers.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        // journal_mode reports the new mode as a result row.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        schema::migrate(conn)?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;
    tracing::debug!("sqlite schema up to date");
    Ok(())
  }

  /// Shared implementation of the three post page queries.
  async fn fetch_post_page(
    &self,
    filter: PostFilter,
    request: PageRequest,
  ) -> Result<Page<PostOverview>> {
    let offset = request.offset();
    let per_page = request.per_page;

    let res = self
      .conn
      .call(move |conn| {
        // Resolve the filter to a key first so an unknown category/tag is
        // a NotFound even when the page number is out of range.
        let (count_sql, page_sql, key): (&str, String, Option<i64>) =
          match &filter {
            PostFilter::All => (
              "SELECT COUNT(*) FROM posts",
              format!(
                "{POST_SELECT} ORDER BY p.timestamp DESC LIMIT ?1 OFFSET ?2"
              ),
              None,
            ),
            PostFilter::Category(name) => {
              let id: Option<i64> = conn
                .query_row(
                  "SELECT id FROM categories WHERE name = ?1",
                  params![name],
                  |row| row.get(0),
                )
                .optional()?;
              let Some(id) = id else {
                return Ok(Err(Error::CategoryNotFound(name.clone())));
              };
              (
                "SELECT COUNT(*) FROM posts WHERE category_id = ?1",
                format!(
                  "{POST_SELECT} WHERE p.category_id = ?1
                   ORDER BY p.timestamp DESC LIMIT ?2 OFFSET ?3"
                ),
                Some(id),
              )
            }
            PostFilter::Tag(name) => {
              let id: Option<i64> = conn
                .query_row(
                  "SELECT id FROM tags WHERE name = ?1",
                  params![name],
                  |row| row.get(0),
                )
                .optional()?;
              let Some(id) = id else {
                return Ok(Err(Error::TagNotFound(name.clone())));
              };
              (
                "SELECT COUNT(*) FROM tagging WHERE tag_id = ?1",
                format!(
                  "{POST_SELECT} JOIN tagging g ON g.post_id = p.id
                   WHERE g.tag_id = ?1
                   ORDER BY g.timestamp DESC LIMIT ?2 OFFSET ?3"
                ),
                Some(id),
              )
            }
          };

        let total: i64 = match key {
          Some(id) => conn.query_row(count_sql, params![id], |row| row.get(0))?,
          None => conn.query_row(count_sql, [], |row| row.get(0))?,
        };

        // Pages below 1 yield an empty slice without touching the rows.
        let Some(offset) = offset else {
          return Ok(Ok((Vec::new(), total)));
        };

        let raws = match key {
          Some(id) => {
            read_post_rows(conn, &page_sql, params![id, per_page, offset])?
          }
          None => read_post_rows(conn, &page_sql, params![per_page, offset])?,
        };
        let rows = attach_tag_names(conn, raws)?;
        Ok(Ok((rows, total)))
      })
      .await
      .map_err(Error::storage)?;

    let (rows, total) = res?;
    let items = rows
      .into_iter()
      .map(|(raw, tags)| raw.into_overview(tags))
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::assemble(items, request, total))
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  // ── Users ─────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let member_since = Utc::now();
    let at_str = encode_dt(member_since);
    let role_str = encode_role(input.role).to_owned();
    let username = input.username.clone();
    let password_hash = input.password_hash;

    let res = self
      .conn
      .call(move |conn| {
        let taken: Option<i64> = conn
          .query_row(
            "SELECT id FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(Err(Error::UserExists(username)));
        }
        conn.execute(
          "INSERT INTO users (username, password_hash, role, member_since)
           VALUES (?1, ?2, ?3, ?4)",
          params![username, password_hash, role_str, at_str],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await
      .map_err(Error::storage)?;

    let id = res?;
    Ok(User {
      id,
      username: input.username,
      role: input.role,
      member_since,
    })
  }

  async fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> Result<Option<(User, String)>> {
    let username = username.to_owned();
    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, username, role, member_since, password_hash
               FROM users WHERE username = ?1",
              params![username],
              |row| {
                Ok((
                  RawUser {
                    id:           row.get(0)?,
                    username:     row.get(1)?,
                    role:         row.get(2)?,
                    member_since: row.get(3)?,
                  },
                  row.get(4)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    raw
      .map(|(raw, hash)| Ok((raw.into_user()?, hash)))
      .transpose()
  }

  async fn list_users_page(&self, request: PageRequest) -> Result<Page<User>> {
    let offset = request.offset();
    let per_page = request.per_page;

    let (raws, total) = self
      .conn
      .call(move |conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let Some(offset) = offset else {
          return Ok((Vec::new(), total));
        };
        let mut stmt = conn.prepare(
          "SELECT id, username, role, member_since FROM users
           ORDER BY member_since DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let raws = stmt
          .query_map(params![per_page, offset], |row| {
            Ok(RawUser {
              id:           row.get(0)?,
              username:     row.get(1)?,
              role:         row.get(2)?,
              member_since: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((raws, total))
      })
      .await
      .map_err(Error::storage)?;

    let items = raws
      .into_iter()
      .map(RawUser::into_user)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::assemble(items, request, total))
  }

  // ── Categories and tags ───────────────────────────────────────────────

  async fn create_category<'a>(&'a self, name: &'a str) -> Result<Category> {
    let name = name.trim().to_lowercase();
    let stored = name.clone();

    let res = self
      .conn
      .call(move |conn| {
        let existing: Option<i64> = conn
          .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![stored],
            |row| row.get(0),
          )
          .optional()?;
        if existing.is_some() {
          return Ok(Err(Error::CategoryExists(stored)));
        }
        conn
          .execute("INSERT INTO categories (name) VALUES (?1)", params![stored])?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await
      .map_err(Error::storage)?;

    let id = res?;
    Ok(Category { id, name })
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM categories")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Category { id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM tags")?;
        let rows = stmt
          .query_map([], |row| Ok(Tag { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)
  }

  // ── Posts ─────────────────────────────────────────────────────────────

  async fn list_posts_page(
    &self,
    request: PageRequest,
  ) -> Result<Page<PostOverview>> {
    self.fetch_post_page(PostFilter::All, request).await
  }

  async fn list_posts_by_category_page<'a>(
    &'a self,
    category: &'a str,
    request: PageRequest,
  ) -> Result<Page<PostOverview>> {
    self
      .fetch_post_page(PostFilter::Category(category.to_lowercase()), request)
      .await
  }

  async fn list_posts_by_tag_page<'a>(
    &'a self,
    tag: &'a str,
    request: PageRequest,
  ) -> Result<Page<PostOverview>> {
    self
      .fetch_post_page(PostFilter::Tag(tag.to_owned()), request)
      .await
  }

  async fn get_post(&self, id: i64) -> Result<Option<PostOverview>> {
    let row = self
      .conn
      .call(move |conn| {
        let raws = read_post_rows(
          conn,
          &format!("{POST_SELECT} WHERE p.id = ?1"),
          params![id],
        )?;
        Ok(attach_tag_names(conn, raws)?.pop())
      })
      .await
      .map_err(Error::storage)?;

    row.map(|(raw, tags)| raw.into_overview(tags)).transpose()
  }

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let timestamp = Utc::now();
    let at_str = encode_dt(timestamp);
    let category = input.category.trim().to_lowercase();
    let title = input.title.clone();
    let body = input.body.clone();
    let author_id = input.author_id;

    let res = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let category_id: Option<i64> = tx
          .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![category],
            |row| row.get(0),
          )
          .optional()?;
        let Some(category_id) = category_id else {
          return Ok(Err(Error::CategoryNotFound(category)));
        };
        tx.execute(
          "INSERT INTO posts (title, body, timestamp, author_id, category_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![title, body, at_str, author_id, category_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok((id, category_id)))
      })
      .await
      .map_err(Error::storage)?;

    let (id, category_id) = res?;
    Ok(Post {
      id,
      title: input.title,
      body: input.body,
      timestamp,
      last_edit: None,
      author_id: input.author_id,
      category_id,
      thumb_up: 0,
    })
  }

  async fn update_post(&self, id: i64, input: PostUpdate) -> Result<Post> {
    let last_edit = Utc::now();
    let edit_str = encode_dt(last_edit);
    let category = input.category.trim().to_lowercase();
    let title = input.title.clone();
    let body = input.body.clone();
    let author_id = input.author_id;

    let res = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let category_id: Option<i64> = tx
          .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![category],
            |row| row.get(0),
          )
          .optional()?;
        let Some(category_id) = category_id else {
          return Ok(Err(Error::CategoryNotFound(category)));
        };
        let changed = tx.execute(
          "UPDATE posts
           SET title = ?1, body = ?2, author_id = ?3, category_id = ?4,
               last_edit = ?5
           WHERE id = ?6",
          params![title, body, author_id, category_id, edit_str, id],
        )?;
        if changed == 0 {
          return Ok(Err(Error::PostNotFound(id)));
        }
        let (timestamp, thumb_up): (String, i64) = tx.query_row(
          "SELECT timestamp, thumb_up FROM posts WHERE id = ?1",
          params![id],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tx.commit()?;
        Ok(Ok((category_id, timestamp, thumb_up)))
      })
      .await
      .map_err(Error::storage)?;

    let (category_id, timestamp, thumb_up) = res?;
    Ok(Post {
      id,
      title: input.title,
      body: input.body,
      timestamp: crate::encode::decode_dt(&timestamp)?,
      last_edit: Some(last_edit),
      author_id: input.author_id,
      category_id,
      thumb_up,
    })
  }

  /// Cascades inside one transaction: no orphan tagging or comment row can
  /// survive a committed delete.
  async fn delete_post(&self, id: i64) -> Result<()> {
    let res = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tagging WHERE post_id = ?1", params![id])?;
        tx.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
        let changed =
          tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        if changed == 0 {
          // Dropping the transaction rolls the cascade back.
          return Ok(Err(Error::PostNotFound(id)));
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::storage)?;
    res
  }

  async fn increment_thumb(&self, id: i64) -> Result<i64> {
    let res = self
      .conn
      .call(move |conn| {
        // Relative update — never read-modify-write.
        let changed = conn.execute(
          "UPDATE posts SET thumb_up = thumb_up + 1 WHERE id = ?1",
          params![id],
        )?;
        if changed == 0 {
          return Ok(Err(Error::PostNotFound(id)));
        }
        let count: i64 = conn.query_row(
          "SELECT thumb_up FROM posts WHERE id = ?1",
          params![id],
          |row| row.get(0),
        )?;
        Ok(Ok(count))
      })
      .await
      .map_err(Error::storage)?;
    res
  }

  // ── Tagging ───────────────────────────────────────────────────────────

  async fn tag_post(&self, post_id: i64, names: Vec<String>) -> Result<()> {
    if names.is_empty() {
      return Ok(());
    }
    let at_str = encode_dt(Utc::now());

    let res = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists: Option<i64> = tx
          .query_row(
            "SELECT id FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
          )
          .optional()?;
        if exists.is_none() {
          return Ok(Err(Error::PostNotFound(post_id)));
        }
        for name in &names {
          let tag_id: Option<i64> = tx
            .query_row(
              "SELECT id FROM tags WHERE name = ?1",
              params![name],
              |row| row.get(0),
            )
            .optional()?;
          let tag_id = match tag_id {
            Some(id) => id,
            None => {
              tx.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
              tx.last_insert_rowid()
            }
          };
          // Idempotent link: the UNIQUE (post_id, tag_id) pair absorbs
          // repeated submissions.
          tx.execute(
            "INSERT OR IGNORE INTO tagging (post_id, tag_id, timestamp)
             VALUES (?1, ?2, ?3)",
            params![post_id, tag_id, at_str],
          )?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::storage)?;
    res
  }

  // ── Comments ──────────────────────────────────────────────────────────

  async fn add_comment(
    &self,
    post_id: i64,
    body: String,
    author_id: i64,
    parent_id: Option<i64>,
  ) -> Result<Comment> {
    let timestamp = Utc::now();
    let at_str = encode_dt(timestamp);
    let stored_body = body.clone();

    let res = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let post_exists: Option<i64> = tx
          .query_row(
            "SELECT id FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
          )
          .optional()?;
        if post_exists.is_none() {
          return Ok(Err(Error::PostNotFound(post_id)));
        }
        if let Some(parent) = parent_id {
          let parent_post: Option<i64> = tx
            .query_row(
              "SELECT post_id FROM comments WHERE id = ?1",
              params![parent],
              |row| row.get(0),
            )
            .optional()?;
          match parent_post {
            None => return Ok(Err(Error::CommentNotFound(parent))),
            Some(p) if p != post_id => {
              return Ok(Err(Error::ParentMismatch { parent, post: post_id }));
            }
            Some(_) => {}
          }
        }
        tx.execute(
          "INSERT INTO comments (body, timestamp, author_id, post_id, parent_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![stored_body, at_str, author_id, post_id, parent_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await
      .map_err(Error::storage)?;

    let id = res?;
    Ok(Comment { id, body, timestamp, author_id, post_id, parent_id })
  }

  async fn list_comments_page(
    &self,
    request: PageRequest,
  ) -> Result<Page<CommentOverview>> {
    let offset = request.offset();
    let per_page = request.per_page;

    let (raws, total) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn
          .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))?;
        let Some(offset) = offset else {
          return Ok((Vec::new(), total));
        };
        let mut stmt = conn.prepare(
          "SELECT c.id, c.body, c.timestamp, u.username, c.post_id, p.title,
                  c.parent_id
           FROM comments c
           JOIN users u ON u.id = c.author_id
           JOIN posts p ON p.id = c.post_id
           ORDER BY c.timestamp DESC, c.id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let raws = stmt
          .query_map(params![per_page, offset], |row| {
            Ok(RawCommentOverview {
              id:         row.get(0)?,
              body:       row.get(1)?,
              timestamp:  row.get(2)?,
              author:     row.get(3)?,
              post_id:    row.get(4)?,
              post_title: row.get(5)?,
              parent_id:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((raws, total))
      })
      .await
      .map_err(Error::storage)?;

    let items = raws
      .into_iter()
      .map(RawCommentOverview::into_overview)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::assemble(items, request, total))
  }

  // ── Messages ──────────────────────────────────────────────────────────

  async fn add_message(
    &self,
    title: String,
    body: String,
    author_id: i64,
  ) -> Result<Message> {
    let timestamp = Utc::now();
    let at_str = encode_dt(timestamp);
    let stored_title = title.clone();
    let stored_body = body.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (title, body, timestamp, author_id)
           VALUES (?1, ?2, ?3, ?4)",
          params![stored_title, stored_body, at_str, author_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::storage)?;

    Ok(Message { id, title, body, timestamp, author_id })
  }

  async fn list_messages(&self) -> Result<Vec<MessageOverview>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT m.id, m.title, m.body, m.timestamp, u.username
           FROM messages m
           JOIN users u ON u.id = m.author_id
           ORDER BY m.timestamp DESC, m.id DESC",
        )?;
        let raws = stmt
          .query_map([], |row| {
            Ok(RawMessageOverview {
              id:        row.get(0)?,
              title:     row.get(1)?,
              body:      row.get(2)?,
              timestamp: row.get(3)?,
              author:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await
      .map_err(Error::storage)?;

    raws
      .into_iter()
      .map(RawMessageOverview::into_overview)
      .collect()
  }
}
