//! Form payloads and their validation rules.
//!
//! Validation never aborts the request: a failed form is re-rendered at
//! 200 with the submitted values and field errors attached, so the client
//! can redisplay what the user typed.

use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 64;

/// One failed validation rule, keyed by form field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: &'static str,
}

fn err(field: &'static str, message: &'static str) -> FieldError {
  FieldError { field, message }
}

// ─── Message board ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub body:  String,
}

impl MessageForm {
  pub fn validate(&self) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if self.title.trim().is_empty() {
      errors.push(err("title", "title is required"));
    } else if self.title.chars().count() > TITLE_MAX_CHARS {
      errors.push(err("title", "title is too long"));
    }
    if self.body.trim().is_empty() {
      errors.push(err("body", "body is required"));
    }
    errors
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentForm {
  #[serde(default)]
  pub body:      String,
  pub parent_id: Option<i64>,
}

impl CommentForm {
  pub fn validate(&self) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if self.body.trim().is_empty() {
      errors.push(err("body", "body is required"));
    }
    errors
  }
}

// ─── Post editor ─────────────────────────────────────────────────────────────

/// Shared by `/write-blog` and `/edit/{id}`. `tags` is the raw
/// comma-separated string; normalisation happens on submit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostForm {
  #[serde(default)]
  pub title:    String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub content:  String,
  #[serde(default)]
  pub tags:     String,
}

impl PostForm {
  pub fn validate(&self) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if self.title.trim().is_empty() {
      errors.push(err("title", "title is required"));
    } else if self.title.chars().count() > TITLE_MAX_CHARS {
      errors.push(err("title", "title is too long"));
    }
    if self.category.trim().is_empty() {
      errors.push(err("category", "category is required"));
    }
    if self.content.trim().is_empty() {
      errors.push(err("content", "content is required"));
    }
    errors
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_message_fails_both_fields() {
    let errors = MessageForm::default().validate();
    assert_eq!(errors.len(), 2);
  }

  #[test]
  fn overlong_title_is_rejected() {
    let form = MessageForm {
      title: "x".repeat(TITLE_MAX_CHARS + 1),
      body:  "hello".to_string(),
    };
    let errors = form.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "title");
  }

  #[test]
  fn whitespace_only_comment_is_invalid() {
    let form = CommentForm { body: "   ".to_string(), parent_id: None };
    assert!(!form.validate().is_empty());
  }

  #[test]
  fn complete_post_form_passes() {
    let form = PostForm {
      title:    "Hello".to_string(),
      category: "tech".to_string(),
      content:  "World".to_string(),
      tags:     String::new(),
    };
    assert!(form.validate().is_empty());
  }
}
