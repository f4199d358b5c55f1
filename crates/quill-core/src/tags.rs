//! Tag-string normalisation.
//!
//! The editor submits tags as one comma-separated string. Normalisation
//! never fails: malformed or empty input simply yields no tokens.

/// Split `raw` on commas, trim whitespace, lower-case each token, drop
/// empties, and deduplicate preserving first-appearance order.
pub fn normalize_tags(raw: &str) -> Vec<String> {
  let mut seen = Vec::new();
  for token in raw.split(',') {
    let token = token.trim().to_lowercase();
    if token.is_empty() || seen.contains(&token) {
      continue;
    }
    seen.push(token);
  }
  seen
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lowercases_and_dedups_preserving_order() {
    assert_eq!(normalize_tags("A, a , B"), vec!["a", "b"]);
    assert_eq!(normalize_tags("Rust,web,RUST,Web"), vec!["rust", "web"]);
  }

  #[test]
  fn whitespace_and_commas_only_yield_nothing() {
    assert!(normalize_tags("").is_empty());
    assert!(normalize_tags("  ,  ").is_empty());
    assert!(normalize_tags(",,,").is_empty());
  }

  #[test]
  fn inner_whitespace_is_kept() {
    assert_eq!(normalize_tags(" Systems Programming "), vec![
      "systems programming"
    ]);
  }
}
