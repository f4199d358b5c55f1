//! The `ContentStore` trait — the content repository contract.
//!
//! Implemented by storage backends (e.g. `quill-store-sqlite`). The web
//! layer depends on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with `axum`). Unlike a generic
//! backend error, every method returns [`crate::Error`] directly: the
//! HTTP layer needs the domain taxonomy (not-found vs backend fault) and
//! backends wrap their own failures in [`crate::Error::Storage`].

use std::future::Future;

use crate::{
  Result,
  models::{
    Category, Comment, CommentOverview, Message, MessageOverview, NewPost,
    NewUser, Post, PostOverview, PostUpdate, Tag, User,
  },
  page::{Page, PageRequest},
};

/// Abstraction over the blog's relational store.
///
/// Mutating operations execute within a transaction scoped to the single
/// call, so a mid-operation failure leaves no partial rows.
pub trait ContentStore: Send + Sync {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Fails with [`crate::Error::UserExists`] if the
  /// username is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Look up an account and its password hash. Returns `None` if the
  /// username is unknown.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<(User, String)>>> + Send + 'a;

  /// Accounts ordered by `member_since` descending.
  fn list_users_page(
    &self,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<User>>> + Send + '_;

  // ── Categories and tags ───────────────────────────────────────────────

  /// Create a category; the name is stored lower-cased and must be unique.
  fn create_category<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Category>> + Send + 'a;

  /// Unordered full scan; small cardinality assumed.
  fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send + '_;

  /// Unordered full scan; small cardinality assumed.
  fn list_tags(&self) -> impl Future<Output = Result<Vec<Tag>>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Posts ordered by timestamp descending. Out-of-range pages yield an
  /// empty item slice, never an error.
  fn list_posts_page(
    &self,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<PostOverview>>> + Send + '_;

  /// Same contract as [`Self::list_posts_page`], filtered to one category.
  /// The match is case-insensitive (the input is lower-cased). Fails with
  /// [`crate::Error::CategoryNotFound`] if no category matches.
  fn list_posts_by_category_page<'a>(
    &'a self,
    category: &'a str,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<PostOverview>>> + Send + 'a;

  /// Posts carrying the tag with this exact name, joined through the
  /// tagging table and ordered by tagging timestamp descending (recent tag
  /// use first). Fails with [`crate::Error::TagNotFound`] if absent.
  fn list_posts_by_tag_page<'a>(
    &'a self,
    tag: &'a str,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<PostOverview>>> + Send + 'a;

  /// Full post with tags resolved. Returns `None` if the id is unknown.
  fn get_post(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PostOverview>>> + Send + '_;

  /// Persist a new post. The category is resolved by name within the same
  /// transaction; [`crate::Error::CategoryNotFound`] persists nothing.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post>> + Send + '_;

  /// Rewrite title/body/author/category and stamp `last_edit`. Same
  /// category rule as [`Self::create_post`];
  /// [`crate::Error::PostNotFound`] if the id is unknown.
  fn update_post(
    &self,
    id: i64,
    input: PostUpdate,
  ) -> impl Future<Output = Result<Post>> + Send + '_;

  /// Delete a post and cascade its tagging and comment rows in one
  /// transaction. A second call fails [`crate::Error::PostNotFound`].
  fn delete_post(&self, id: i64) -> impl Future<Output = Result<()>> + Send + '_;

  /// Atomically increment the thumb-up counter and return the new value.
  /// Concurrent increments must not lose updates.
  fn increment_thumb(&self, id: i64) -> impl Future<Output = Result<i64>> + Send + '_;

  // ── Tagging ───────────────────────────────────────────────────────────

  /// Link the already-normalised tag `names` to a post, creating missing
  /// tags on first use. Linking is idempotent: an existing (post, tag)
  /// pair is never duplicated. An empty slice is a no-op, not an error.
  fn tag_post(
    &self,
    post_id: i64,
    names: Vec<String>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Append a comment, optionally threaded under `parent_id`. The parent
  /// must be a comment on the same post.
  fn add_comment(
    &self,
    post_id: i64,
    body: String,
    author_id: i64,
    parent_id: Option<i64>,
  ) -> impl Future<Output = Result<Comment>> + Send + '_;

  /// Comments ordered by timestamp descending, joined with author and
  /// post title for the management console.
  fn list_comments_page(
    &self,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<CommentOverview>>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Append a message-board entry.
  fn add_message(
    &self,
    title: String,
    body: String,
    author_id: i64,
  ) -> impl Future<Output = Result<Message>> + Send + '_;

  /// All messages, newest first. The board is small; no pagination.
  fn list_messages(
    &self,
  ) -> impl Future<Output = Result<Vec<MessageOverview>>> + Send + '_;
}
