//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; roles as lowercase
//! discriminants matching their serde names.

use chrono::{DateTime, Utc};
use quill_core::{
  Error, Result,
  models::{CommentOverview, MessageOverview, PostOverview, User},
  permission::Role,
};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
  match role {
    Role::User => "user",
    Role::Moderator => "moderator",
    Role::Administrator => "administrator",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "moderator" => Ok(Role::Moderator),
    "administrator" => Ok(Role::Administrator),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:           i64,
  pub username:     String,
  pub role:         String,
  pub member_since: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           self.id,
      username:     self.username,
      role:         decode_role(&self.role)?,
      member_since: decode_dt(&self.member_since)?,
    })
  }
}

/// A `posts` row joined with author username and category name.
/// Tag names are attached separately before decoding.
pub struct RawPostOverview {
  pub id:        i64,
  pub title:     String,
  pub body:      String,
  pub timestamp: String,
  pub last_edit: Option<String>,
  pub author:    String,
  pub category:  String,
  pub thumb_up:  i64,
}

impl RawPostOverview {
  pub fn into_overview(self, tags: Vec<String>) -> Result<PostOverview> {
    Ok(PostOverview {
      id:        self.id,
      title:     self.title,
      body:      self.body,
      timestamp: decode_dt(&self.timestamp)?,
      last_edit: self.last_edit.as_deref().map(decode_dt).transpose()?,
      author:    self.author,
      category:  self.category,
      tags,
      thumb_up:  self.thumb_up,
    })
  }
}

/// A `comments` row joined with author username and post title.
pub struct RawCommentOverview {
  pub id:         i64,
  pub body:       String,
  pub timestamp:  String,
  pub author:     String,
  pub post_id:    i64,
  pub post_title: String,
  pub parent_id:  Option<i64>,
}

impl RawCommentOverview {
  pub fn into_overview(self) -> Result<CommentOverview> {
    Ok(CommentOverview {
      id:         self.id,
      body:       self.body,
      timestamp:  decode_dt(&self.timestamp)?,
      author:     self.author,
      post_id:    self.post_id,
      post_title: self.post_title,
      parent_id:  self.parent_id,
    })
  }
}

/// A `messages` row joined with author username.
pub struct RawMessageOverview {
  pub id:        i64,
  pub title:     String,
  pub body:      String,
  pub timestamp: String,
  pub author:    String,
}

impl RawMessageOverview {
  pub fn into_overview(self) -> Result<MessageOverview> {
    Ok(MessageOverview {
      id:        self.id,
      title:     self.title,
      body:      self.body,
      timestamp: decode_dt(&self.timestamp)?,
      author:    self.author,
    })
  }
}
