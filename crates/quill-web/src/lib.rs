//! HTTP layer for Quill.
//!
//! Exposes an axum [`Router`] serving the blog's JSON routes backed by
//! any [`ContentStore`] and [`MediaStore`]. Authentication is HTTP Basic
//! against the `users` table; role capabilities gate the mutating and
//! management routes.

pub mod auth;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod media;
pub mod view;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use quill_core::{
  media::MediaStore,
  models::NewUser,
  permission::Role,
  store::ContentStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{admin, public};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub posts_per_page:      i64,
  pub upload_dir:          PathBuf,
  pub upload_url_prefix:   String,
  pub admin_username:      String,
  /// Argon2 PHC string for the bootstrap admin account.
  pub admin_password_hash: String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub media:  Arc<M>,
  pub config: Arc<ServerConfig>,
}

/// Create the configured admin account if the username is absent.
/// Runs once at startup; an existing account is left untouched.
pub async fn bootstrap_admin<S: ContentStore>(
  store: &S,
  config: &ServerConfig,
) -> quill_core::Result<()> {
  if store
    .get_user_by_username(&config.admin_username)
    .await?
    .is_none()
  {
    store
      .create_user(NewUser {
        username:      config.admin_username.clone(),
        password_hash: config.admin_password_hash.clone(),
        role:          Role::Administrator,
      })
      .await?;
    tracing::info!(username = %config.admin_username, "admin account created");
  }
  Ok(())
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the blog.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Public
    .route("/", get(public::index::<S, M>))
    .route(
      "/about",
      get(public::about_get::<S, M>).post(public::about_post::<S, M>),
    )
    .route("/search-category/{name}", get(public::search_category::<S, M>))
    .route("/search-tag/{name}", get(public::search_tag::<S, M>))
    .route(
      "/blog/{id}",
      get(public::blog_get::<S, M>).post(public::blog_post::<S, M>),
    )
    .route("/thumb-up/{id}", post(public::thumb_up::<S, M>))
    // Management console
    .route("/manage-blog", get(admin::manage_blog::<S, M>))
    .route("/manage-comment", get(admin::manage_comment::<S, M>))
    .route("/manage-user", get(admin::manage_user::<S, M>))
    .route(
      "/write-blog",
      get(admin::write_blog_get::<S, M>).post(admin::write_blog_post::<S, M>),
    )
    .route(
      "/edit/{id}",
      get(admin::edit_get::<S, M>).post(admin::edit_post::<S, M>),
    )
    .route("/delete/{id}", get(admin::delete::<S, M>))
    .route("/upload_img", post(admin::upload_img::<S, M>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
