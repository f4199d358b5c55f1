//! The `MediaStore` trait — the upload gateway.
//!
//! Image hosting is an external collaborator behind this one-method
//! interface; the route handler neither knows nor cares whether bytes
//! land on local disk or in an object store.

use std::future::Future;

use crate::Result;

/// Narrow contract for image uploads.
pub trait MediaStore: Send + Sync {
  /// Persist `data` under a name derived from `filename` and return the
  /// public URL of the stored object. Failures surface as
  /// [`crate::Error::Upload`].
  fn upload<'a>(
    &'a self,
    data: Vec<u8>,
    filename: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}
