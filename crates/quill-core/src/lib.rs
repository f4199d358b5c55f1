//! Core types and trait definitions for the Quill blog engine.
//!
//! Domain models, the permission bitmask, pagination, tag
//! normalisation, and the `ContentStore`/`MediaStore` contracts. No
//! HTTP or database dependencies live here; the web and store crates
//! both build on this one.

// Implementations write plain `async fn` for the `impl Future` trait
// methods. Suppress the advisory lint about `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod media;
pub mod models;
pub mod page;
pub mod permission;
pub mod store;
pub mod tags;

pub use error::{Error, Result};
