//! Local-filesystem [`MediaStore`] implementation.

use std::path::PathBuf;

use quill_core::{Error, Result, media::MediaStore};
use sha2::{Digest as _, Sha256};
use tokio::fs;

/// Stores uploads under a two-level shard of their SHA-256 hash, keeping
/// the original extension. Identical bytes land on the same path no
/// matter what name they were submitted under.
#[derive(Clone)]
pub struct LocalMediaStore {
  root:       PathBuf,
  url_prefix: String,
}

impl LocalMediaStore {
  pub fn new(root: PathBuf, url_prefix: impl Into<String>) -> Self {
    Self { root, url_prefix: url_prefix.into() }
  }

  /// `abcdef…png` → (`<root>/ab/cd/abcdef…png`, `ab/cd/abcdef…png`).
  fn sharded(&self, name: &str) -> (PathBuf, String) {
    let rel = format!("{}/{}/{name}", &name[0..2], &name[2..4]);
    (self.root.join(&rel), rel)
  }
}

impl MediaStore for LocalMediaStore {
  async fn upload<'a>(
    &'a self,
    data: Vec<u8>,
    filename: &'a str,
  ) -> Result<String> {
    let hash = hex::encode(Sha256::digest(&data));
    let ext = std::path::Path::new(filename)
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| format!(".{}", e.to_lowercase()))
      .unwrap_or_default();
    let (path, rel) = self.sharded(&format!("{hash}{ext}"));
    let url = format!("{}/{rel}", self.url_prefix);

    let parent = path
      .parent()
      .ok_or_else(|| Error::Upload("invalid upload path".to_string()))?;
    fs::create_dir_all(parent)
      .await
      .map_err(|e| Error::Upload(e.to_string()))?;

    // Content-addressed: an existing file already holds these bytes.
    if fs::try_exists(&path)
      .await
      .map_err(|e| Error::Upload(e.to_string()))?
    {
      return Ok(url);
    }
    fs::write(&path, &data)
      .await
      .map_err(|e| Error::Upload(e.to_string()))?;
    tracing::debug!(path = %path.display(), "upload stored");
    Ok(url)
  }
}
