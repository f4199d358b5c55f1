//! JSON view-models returned by the route handlers.

use chrono::{DateTime, Utc};
use quill_core::{
  models::{MessageOverview, PostOverview},
  page::Page,
};
use serde::Serialize;

use crate::forms::{CommentForm, FieldError, MessageForm};

/// Character budget for post bodies in list views.
const PREVIEW_CHARS: usize = 256;

/// Truncate a post body for a list view. Counts characters, not bytes;
/// the marker is appended only when something was actually cut.
pub fn preview(body: &str) -> String {
  match body.char_indices().nth(PREVIEW_CHARS) {
    Some((cut, _)) => format!("{}...", &body[..cut]),
    None => body.to_string(),
  }
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// Page metadata echoed alongside every paginated listing.
#[derive(Debug, Serialize)]
pub struct Pagination {
  pub page:        i64,
  pub per_page:    i64,
  pub total_count: i64,
  pub total_pages: i64,
}

impl Pagination {
  pub fn of<T>(page: &Page<T>) -> Self {
    Self {
      page:        page.page,
      per_page:    page.per_page,
      total_count: page.total_count,
      total_pages: page.total_pages,
    }
  }
}

/// One post in a list view, body already truncated.
#[derive(Debug, Serialize)]
pub struct PostListItem {
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

impl From<PostOverview> for PostListItem {
  fn from(p: PostOverview) -> Self {
    Self {
      id:        p.id,
      title:     p.title,
      body:      preview(&p.body),
      timestamp: p.timestamp,
      last_edit: p.last_edit,
      author:    p.author,
      category:  p.category,
      tags:      p.tags,
      thumb_up:  p.thumb_up,
    }
  }
}

/// The index and search listings: truncated posts plus the category and
/// tag clouds for the sidebar.
#[derive(Debug, Serialize)]
pub struct ListView {
  pub posts:      Vec<PostListItem>,
  pub pagination: Pagination,
  pub categories: Vec<String>,
  pub tags:       Vec<String>,
}

/// A paginated management-console listing.
#[derive(Debug, Serialize)]
pub struct ManageView<T> {
  pub items:      Vec<T>,
  pub pagination: Pagination,
}

// ─── Detail and form views ───────────────────────────────────────────────────

/// Full-body post detail with the comment form (re-rendered with errors
/// after a failed submission).
#[derive(Debug, Serialize)]
pub struct PostView {
  pub post:   PostOverview,
  pub form:   CommentForm,
  pub errors: Vec<FieldError>,
}

/// The about page: message board plus its form.
#[derive(Debug, Serialize)]
pub struct AboutView {
  pub messages: Vec<MessageOverview>,
  pub form:     MessageForm,
  pub errors:   Vec<FieldError>,
}

/// Editor scaffold for `/write-blog` (blank) and `/edit/{id}`
/// (pre-filled). `url` is where the form posts back.
#[derive(Debug, Serialize)]
pub struct EditorView {
  pub url:        String,
  pub title:      String,
  pub category:   String,
  pub content:    String,
  pub tags:       String,
  pub categories: Vec<String>,
  pub errors:     Vec<FieldError>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_bodies_pass_through_unmarked() {
    assert_eq!(preview("hello"), "hello");
    let exact = "x".repeat(256);
    assert_eq!(preview(&exact), exact);
  }

  #[test]
  fn long_bodies_are_cut_at_256_chars() {
    let long = "x".repeat(300);
    let cut = preview(&long);
    assert_eq!(cut.chars().count(), 259);
    assert!(cut.ends_with("..."));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let long = "é".repeat(300);
    let cut = preview(&long);
    assert_eq!(cut.chars().count(), 259);
    assert!(cut.starts_with('é'));
  }
}
