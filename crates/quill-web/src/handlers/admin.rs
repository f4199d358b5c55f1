//! Management-console routes; every handler requires ADMINISTER.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET`  | `/manage-blog` | paginated posts |
//! | `GET`  | `/manage-comment` | paginated comments |
//! | `GET`  | `/manage-user` | paginated accounts |
//! | `GET`/`POST` | `/write-blog` | editor scaffold / `{"url"}` |
//! | `GET`/`POST` | `/edit/{id}` | pre-filled editor / `{"url"}` |
//! | `GET`  | `/delete/{id}` | 303 → `/manage-blog` |
//! | `POST` | `/upload_img` | `{"location"}` |

use axum::{
  Form, Json,
  extract::{Multipart, Path, Query, State},
  response::{IntoResponse, Redirect, Response},
};
use quill_core::{
  media::MediaStore,
  models::{CommentOverview, NewPost, PostUpdate, User},
  permission::Capability,
  store::ContentStore,
  tags::normalize_tags,
};
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  forms::{FieldError, PostForm},
  handlers::public::PageQuery,
  view::{EditorView, ManageView, Pagination, PostListItem},
};

// ─── Listings ────────────────────────────────────────────────────────────────

/// `GET /manage-blog?page=N`
pub async fn manage_blog<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Query(query): Query<PageQuery>,
) -> Result<Json<ManageView<PostListItem>>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  let page = state
    .store
    .list_posts_page(query.request(state.config.posts_per_page))
    .await?;
  Ok(Json(ManageView {
    pagination: Pagination::of(&page),
    items: page.items.into_iter().map(PostListItem::from).collect(),
  }))
}

/// `GET /manage-comment?page=N`
pub async fn manage_comment<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Query(query): Query<PageQuery>,
) -> Result<Json<ManageView<CommentOverview>>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  let page = state
    .store
    .list_comments_page(query.request(state.config.posts_per_page))
    .await?;
  Ok(Json(ManageView {
    pagination: Pagination::of(&page),
    items: page.items,
  }))
}

/// `GET /manage-user?page=N`
pub async fn manage_user<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Query(query): Query<PageQuery>,
) -> Result<Json<ManageView<User>>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  let page = state
    .store
    .list_users_page(query.request(state.config.posts_per_page))
    .await?;
  Ok(Json(ManageView {
    pagination: Pagination::of(&page),
    items: page.items,
  }))
}

// ─── Editor ──────────────────────────────────────────────────────────────────

async fn editor_view<S: ContentStore>(
  store: &S,
  url: String,
  form: PostForm,
  errors: Vec<FieldError>,
) -> Result<EditorView, Error> {
  let categories = store
    .list_categories()
    .await?
    .into_iter()
    .map(|c| c.name)
    .collect();
  Ok(EditorView {
    url,
    title: form.title,
    category: form.category,
    content: form.content,
    tags: form.tags,
    categories,
    errors,
  })
}

/// `GET /write-blog` — blank editor scaffold.
pub async fn write_blog_get<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
) -> Result<Json<EditorView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  let view = editor_view(
    state.store.as_ref(),
    "/write-blog".to_string(),
    PostForm::default(),
    Vec::new(),
  )
  .await?;
  Ok(Json(view))
}

/// `POST /write-blog` — create the post and link its tags.
pub async fn write_blog_post<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Form(form): Form<PostForm>,
) -> Result<Response, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;

  let errors = form.validate();
  if !errors.is_empty() {
    let view = editor_view(
      state.store.as_ref(),
      "/write-blog".to_string(),
      form,
      errors,
    )
    .await?;
    return Ok(Json(view).into_response());
  }

  let tags = normalize_tags(&form.tags);
  let post = state
    .store
    .create_post(NewPost {
      title:     form.title,
      body:      form.content,
      author_id: user.id,
      category:  form.category,
    })
    .await?;
  state.store.tag_post(post.id, tags).await?;
  tracing::info!(post_id = post.id, user = %user.username, "post written");
  Ok(Json(json!({ "url": "/manage-blog" })).into_response())
}

/// `GET /edit/{id}` — editor pre-filled from the stored post.
pub async fn edit_get<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<EditorView>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  let post = state
    .store
    .get_post(id)
    .await?
    .ok_or_else(|| Error::NotFound(format!("post {id} not found")))?;
  let form = PostForm {
    title:    post.title,
    category: post.category,
    content:  post.body,
    tags:     post.tags.join(", "),
  };
  let view = editor_view(
    state.store.as_ref(),
    format!("/edit/{id}"),
    form,
    Vec::new(),
  )
  .await?;
  Ok(Json(view))
}

/// `POST /edit/{id}` — rewrite the post; tags are re-normalised and
/// linked the same way as on create.
pub async fn edit_post<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Path(id): Path<i64>,
  Form(form): Form<PostForm>,
) -> Result<Response, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;

  let errors = form.validate();
  if !errors.is_empty() {
    let view = editor_view(
      state.store.as_ref(),
      format!("/edit/{id}"),
      form,
      errors,
    )
    .await?;
    return Ok(Json(view).into_response());
  }

  let tags = normalize_tags(&form.tags);
  state
    .store
    .update_post(id, PostUpdate {
      title:     form.title,
      body:      form.content,
      author_id: user.id,
      category:  form.category,
    })
    .await?;
  state.store.tag_post(id, tags).await?;
  tracing::info!(post_id = id, user = %user.username, "post edited");
  Ok(Json(json!({ "url": "/manage-blog" })).into_response())
}

/// `GET /delete/{id}` — cascade delete, then back to the console.
pub async fn delete<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;
  state.store.delete_post(id).await?;
  tracing::info!(post_id = id, user = %user.username, "post deleted");
  Ok(Redirect::to("/manage-blog").into_response())
}

// ─── Upload ──────────────────────────────────────────────────────────────────

/// `POST /upload_img` — multipart upload forwarded to the media store.
/// The editor expects `{"location": <url>}` back.
pub async fn upload_img<S, M>(
  State(state): State<AppState<S, M>>,
  user: CurrentUser,
  mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, Error>
where
  S: ContentStore + Clone + Send + Sync + 'static,
  M: MediaStore + Clone + Send + Sync + 'static,
{
  user.require(Capability::ADMINISTER)?;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.to_string()))?
  {
    if field.name() != Some("file") {
      continue;
    }
    let filename = field.file_name().unwrap_or("upload").to_string();
    let data = field
      .bytes()
      .await
      .map_err(|e| Error::BadRequest(e.to_string()))?;
    let url = state.media.upload(data.to_vec(), &filename).await?;
    tracing::info!(%filename, %url, user = %user.username, "image uploaded");
    return Ok(Json(json!({ "location": url })));
  }
  Err(Error::BadRequest("missing file field".to_string()))
}
