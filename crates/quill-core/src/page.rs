//! Offset-based pagination over an ordered query.
//!
//! Out-of-range page numbers are not errors: the caller renders "no
//! results" instead of an error page, so a page below 1 or past the end
//! yields an empty item slice with the metadata intact.

use serde::Serialize;

/// A 1-indexed page request. `per_page` must be positive.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
  pub page:     i64,
  pub per_page: i64,
}

impl PageRequest {
  pub fn new(page: i64, per_page: i64) -> Self {
    debug_assert!(per_page > 0, "per_page must be positive");
    Self { page, per_page }
  }

  /// The `OFFSET` for this page, or `None` when the page number is below 1
  /// (which must produce an empty slice rather than SQL with a negative
  /// offset).
  pub fn offset(&self) -> Option<i64> {
    if self.page < 1 {
      None
    } else {
      Some((self.page - 1) * self.per_page)
    }
  }
}

/// One page of an ordered result set plus total-count metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub page:        i64,
  pub per_page:    i64,
  pub total_count: i64,
  pub total_pages: i64,
}

impl<T> Page<T> {
  /// Assemble a page from the fetched slice and the full count.
  /// `total_pages` is `ceil(total_count / per_page)`.
  pub fn assemble(items: Vec<T>, request: PageRequest, total_count: i64) -> Self {
    let total_pages = (total_count + request.per_page - 1) / request.per_page;
    Self {
      items,
      page: request.page,
      per_page: request.per_page,
      total_count,
      total_pages,
    }
  }

  /// An empty page carrying the metadata a real query would have returned.
  pub fn empty(request: PageRequest, total_count: i64) -> Self {
    Self::assemble(Vec::new(), request, total_count)
  }
}
