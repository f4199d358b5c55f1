//! Public routes: listings, post detail, comments, thumb-ups, and the
//! message board.
//!
//! | Method | Path | Guard |
//! |--------|------|-------|
//! | `GET`  | `/` | — |
//! | `GET`/`POST` | `/about` | COMMENT |
//! | `GET`  | `/search-category/{name}` | — |
//! | `GET`  | `/search-tag/{name}` | — |
//! | `GET`/`POST` | `/blog/{id}` | POST: COMMENT |
//! | `POST` | `/thumb-up/{id}` | COMMENT |

use axum::{
  Form, Json,
  extract::{Path, Query, State},
  response::{IntoResponse, Redirect, Response},
};
use quill_core::{
  media::MediaStore,
  models::PostOverview,
  page::{Page, PageRequest},
  permission::Capability,
  store::ContentStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  forms::{CommentForm, MessageForm},
  view::{AboutView, ListView, Pagination, PostListItem, PostView},
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
  pub page: Option<i64>,
}

impl PageQuery {
  pub fn request(&self, per_page: i64) -> PageRequest {
    PageRequest::new(self.page.unwrap_or(1), per_page)
  }
}

/// Attach the sidebar category and tag clouds to a fetched post page.
async fn list_view<S: ContentStore>(
  store: &S,
  page: Page<PostOverview>,
) -> Result<ListView, Error> {
  let categories = store
    .list_categories()
    .await?
    .into_iter()
    .map(|c| c.name)
    .collect();
  let tags = store.list_tags().await?.into_iter().map(|t| t.name).collect();
  Ok(ListView {
    pagination: Pagination::of(&page),
    posts: page.items.into_iter().map(PostListItem::from).collect(),
    categories,
    tags,
  })
}

async fn post_or_404<S: ContentStore>(
  store: &S,
  id: i64,
) -> Result<PostOverview, Error> {
  store
    .get_post(id)
    .await?
    .ok_or_else(|| Error::NotFound(format!("post {id} not found")))
}

// ─── Index and search ────────────────────────────────────────────────────────

/// `GET /?page=N`
pub async fn index<S, M>(
  State(state): State<AppState<S, M>>,
  Query(query): Query<PageQuery>,
) -> Result<Json<ListView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  let page = state
    .store
    .list_posts_page(query.request(state.config.posts_per_page))
    .await?;
  tracing::info!(page = page.page, "index visited");
  Ok(Json(list_view(state.store.as_ref(), page).await?))
}

/// `GET /search-category/{name}?page=N`
pub async fn search_category<S, M>(
  State(state): State<AppState<S, M>>,
  Path(name): Path<String>,
  Query(query): Query<PageQuery>,
) -> Result<Json<ListView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  let page = state
    .store
    .list_posts_by_category_page(
      &name,
      query.request(state.config.posts_per_page),
    )
    .await?;
  tracing::info!(category = %name, page = page.page, "category searched");
  Ok(Json(list_view(state.store.as_ref(), page).await?))
}

/// `GET /search-tag/{name}?page=N`
pub async fn search_tag<S, M>(
  State(state): State<AppState<S, M>>,
  Path(name): Path<String>,
  Query(query): Query<PageQuery>,
) -> Result<Json<ListView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  let page = state
    .store
    .list_posts_by_tag_page(&name, query.request(state.config.posts_per_page))
    .await?;
  tracing::info!(tag = %name, page = page.page, "tag searched");
  Ok(Json(list_view(state.store.as_ref(), page).await?))
}

// ─── Post detail and comments ────────────────────────────────────────────────

/// `GET /blog/{id}` — full body, no truncation.
pub async fn blog_get<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<i64>,
) -> Result<Json<PostView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  let post = post_or_404(state.store.as_ref(), id).await?;
  tracing::info!(post_id = id, "post visited");
  Ok(Json(PostView {
    post,
    form: CommentForm::default(),
    errors: Vec::new(),
  }))
}

/// `POST /blog/{id}` — add a comment, optionally threaded via
/// `parent_id`. Invalid input re-renders the detail view at 200.
pub async fn blog_post<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Path(id): Path<i64>,
  Form(form): Form<CommentForm>,
) -> Result<Response, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::COMMENT)?;

  let errors = form.validate();
  if !errors.is_empty() {
    let post = post_or_404(state.store.as_ref(), id).await?;
    return Ok(Json(PostView { post, form, errors }).into_response());
  }

  let comment = state
    .store
    .add_comment(id, form.body, user.id, form.parent_id)
    .await?;
  tracing::info!(
    post_id = id,
    comment_id = comment.id,
    user = %user.username,
    "comment added"
  );
  Ok(Redirect::to(&format!("/blog/{id}")).into_response())
}

/// `POST /thumb-up/{id}` — atomic increment, returns the detail URL.
pub async fn thumb_up<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::COMMENT)?;
  let count = state.store.increment_thumb(id).await?;
  tracing::info!(post_id = id, thumb_up = count, user = %user.username, "thumb-up");
  Ok(Json(json!({ "url": format!("/blog/{id}") })))
}

// ─── Message board ───────────────────────────────────────────────────────────

/// `GET /about` — the message board with an empty form.
pub async fn about_get<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
) -> Result<Json<AboutView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::COMMENT)?;
  let messages = state.store.list_messages().await?;
  Ok(Json(AboutView {
    messages,
    form: MessageForm::default(),
    errors: Vec::new(),
  }))
}

/// `POST /about` — leave a message; invalid input re-renders at 200.
pub async fn about_post<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Form(form): Form<MessageForm>,
) -> Result<Response, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::COMMENT)?;

  let errors = form.validate();
  if !errors.is_empty() {
    let messages = state.store.list_messages().await?;
    return Ok(Json(AboutView { messages, form, errors }).into_response());
  }

  let message = state
    .store
    .add_message(form.title, form.body, user.id)
    .await?;
  tracing::info!(message_id = message.id, user = %user.username, "message left");
  Ok(Redirect::to("/about").into_response())
}
