//! Domain models — the entities of the blog and the joined "overview"
//! rows returned by list queries.
//!
//! Primary keys are the integer rowids assigned by the store. Overview
//! types carry the author username and category name already resolved so
//! list handlers never issue follow-up lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::Role;

// ─── Users ───────────────────────────────────────────────────────────────────

/// A registered account. The password hash never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:           i64,
  pub username:     String,
  pub role:         Role,
  pub member_since: DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A blog post as stored. `thumb_up` is a plain counter incremented with a
/// relative UPDATE, never read-modify-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:          i64,
  pub title:       String,
  pub body:        String,
  pub timestamp:   DateTime<Utc>,
  pub last_edit:   Option<DateTime<Utc>>,
  pub author_id:   i64,
  pub category_id: i64,
  pub thumb_up:    i64,
}

/// A post joined with its author username, category name, and tag names —
/// the shape every list and detail view consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOverview {
  pub id:        i64,
  pub title:     String,
  pub body:      String,
  pub timestamp: DateTime<Utc>,
  pub last_edit: Option<DateTime<Utc>>,
  pub author:    String,
  pub category:  String,
  pub tags:      Vec<String>,
  pub thumb_up:  i64,
}

/// Input to [`crate::store::ContentStore::create_post`]. The category is
/// referenced by name and must already exist.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:     String,
  pub body:      String,
  pub author_id: i64,
  pub category:  String,
}

/// Input to [`crate::store::ContentStore::update_post`]; same category
/// resolution rule as [`NewPost`].
#[derive(Debug, Clone)]
pub struct PostUpdate {
  pub title:     String,
  pub body:      String,
  pub author_id: i64,
  pub category:  String,
}

// ─── Categories and tags ─────────────────────────────────────────────────────

/// A post category. Names are unique and stored lower-cased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub id:   i64,
  pub name: String,
}

/// A tag. Created lazily on first use; names are unique and lower-cased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub id:   i64,
  pub name: String,
}

/// The join row linking one post to one tag. Its timestamp orders the
/// "posts for tag" listing by recent tag use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tagging {
  pub id:        i64,
  pub post_id:   i64,
  pub tag_id:    i64,
  pub timestamp: DateTime<Utc>,
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// A comment on a post. `parent_id`, when set, references another comment
/// on the same post (threading).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:        i64,
  pub body:      String,
  pub timestamp: DateTime<Utc>,
  pub author_id: i64,
  pub post_id:   i64,
  pub parent_id: Option<i64>,
}

/// A comment joined with its author username and post title, for the
/// management console listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentOverview {
  pub id:         i64,
  pub body:       String,
  pub timestamp:  DateTime<Utc>,
  pub author:     String,
  pub post_id:    i64,
  pub post_title: String,
  pub parent_id:  Option<i64>,
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// A message-board entry on the about page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub id:        i64,
  pub title:     String,
  pub body:      String,
  pub timestamp: DateTime<Utc>,
  pub author_id: i64,
}

/// A message joined with its author username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOverview {
  pub id:        i64,
  pub title:     String,
  pub body:      String,
  pub timestamp: DateTime<Utc>,
  pub author:    String,
}
