//! Integration tests for `SqliteStore` against an in-memory database.

use quill_core::{
  Error,
  models::{NewPost, NewUser, PostUpdate},
  page::PageRequest,
  permission::Role,
  store::ContentStore,
  tags::normalize_tags,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seed_author(s: &SqliteStore) -> i64 {
  s.create_user(NewUser {
    username:      "alice".into(),
    password_hash: "$argon2id$test".into(),
    role:          Role::Administrator,
  })
  .await
  .unwrap()
  .id
}

fn new_post(author_id: i64, title: &str, category: &str) -> NewPost {
  NewPost {
    title: title.into(),
    body: format!("body of {title}"),
    author_id,
    category: category.into(),
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_user_with_hash() {
  let s = store().await;
  let user = s
    .create_user(NewUser {
      username:      "bob".into(),
      password_hash: "$argon2id$hash".into(),
      role:          Role::User,
    })
    .await
    .unwrap();

  let (fetched, hash) = s.get_user_by_username("bob").await.unwrap().unwrap();
  assert_eq!(fetched.id, user.id);
  assert_eq!(fetched.role, Role::User);
  assert_eq!(hash, "$argon2id$hash");
}

#[tokio::test]
async fn unknown_username_returns_none() {
  let s = store().await;
  assert!(s.get_user_by_username("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_rejected() {
  let s = store().await;
  seed_author(&s).await;
  let err = s
    .create_user(NewUser {
      username:      "alice".into(),
      password_hash: "x".into(),
      role:          Role::User,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserExists(_)));
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn category_names_are_lowercased_and_unique() {
  let s = store().await;
  let cat = s.create_category("Tech").await.unwrap();
  assert_eq!(cat.name, "tech");

  let err = s.create_category("TECH").await.unwrap_err();
  assert!(matches!(err, Error::CategoryExists(_)));

  let all = s.list_categories().await.unwrap();
  assert_eq!(all.len(), 1);
}

// ─── Post creation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_resolves_category_case_insensitively() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();

  let post = s.create_post(new_post(author, "Hello", "Tech")).await.unwrap();
  assert_eq!(post.thumb_up, 0);
  assert!(post.last_edit.is_none());

  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.author, "alice");
  assert_eq!(overview.category, "tech");
  assert!(overview.tags.is_empty());
}

#[tokio::test]
async fn create_post_unknown_category_persists_nothing() {
  let s = store().await;
  let author = seed_author(&s).await;

  let err = s
    .create_post(new_post(author, "Orphan", "nope"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(_)));

  let page = s.list_posts_page(PageRequest::new(1, 10)).await.unwrap();
  assert_eq!(page.total_count, 0);
  assert!(page.items.is_empty());
}

#[tokio::test]
async fn get_post_missing_returns_none() {
  let s = store().await;
  assert!(s.get_post(42).await.unwrap().is_none());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_post_changes_fields_and_stamps_last_edit() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  s.create_category("life").await.unwrap();
  let post = s.create_post(new_post(author, "Draft", "tech")).await.unwrap();

  let updated = s
    .update_post(post.id, PostUpdate {
      title:     "Final".into(),
      body:      "rewritten".into(),
      author_id: author,
      category:  "life".into(),
    })
    .await
    .unwrap();

  assert_eq!(updated.title, "Final");
  assert!(updated.last_edit.is_some());
  assert_eq!(updated.timestamp, post.timestamp);

  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.category, "life");
  assert_eq!(overview.body, "rewritten");
}

#[tokio::test]
async fn update_post_unknown_id_fails() {
  let s = store().await;
  seed_author(&s).await;
  s.create_category("tech").await.unwrap();

  let err = s
    .update_post(99, PostUpdate {
      title:     "t".into(),
      body:      "b".into(),
      author_id: 1,
      category:  "tech".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PostNotFound(99)));
}

#[tokio::test]
async fn update_post_unknown_category_fails() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "Keep", "tech")).await.unwrap();

  let err = s
    .update_post(post.id, PostUpdate {
      title:     "t".into(),
      body:      "b".into(),
      author_id: author,
      category:  "missing".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(_)));

  // Original row untouched.
  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.title, "Keep");
}

// ─── Pagination ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn posts_are_paginated_newest_first() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  for i in 1..=5 {
    s.create_post(new_post(author, &format!("post {i}"), "tech"))
      .await
      .unwrap();
  }

  let page1 = s.list_posts_page(PageRequest::new(1, 2)).await.unwrap();
  assert_eq!(page1.items.len(), 2);
  assert_eq!(page1.total_count, 5);
  assert_eq!(page1.total_pages, 3);
  assert_eq!(page1.items[0].title, "post 5");

  let page3 = s.list_posts_page(PageRequest::new(3, 2)).await.unwrap();
  assert_eq!(page3.items.len(), 1);
  assert_eq!(page3.items[0].title, "post 1");
}

#[tokio::test]
async fn out_of_range_pages_are_empty_not_errors() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  for i in 1..=3 {
    s.create_post(new_post(author, &format!("post {i}"), "tech"))
      .await
      .unwrap();
  }

  let reference = s.list_posts_page(PageRequest::new(1, 2)).await.unwrap();

  for page in [0, -1, reference.total_pages + 1, 1000] {
    let result = s.list_posts_page(PageRequest::new(page, 2)).await.unwrap();
    assert!(result.items.is_empty(), "page {page} should be empty");
    assert_eq!(result.total_pages, reference.total_pages);
  }
}

#[tokio::test]
async fn category_page_scenario_three_posts_two_per_page() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  s.create_category("life").await.unwrap();
  for i in 1..=3 {
    s.create_post(new_post(author, &format!("tech {i}"), "tech"))
      .await
      .unwrap();
  }
  s.create_post(new_post(author, "unrelated", "life")).await.unwrap();

  let page1 = s
    .list_posts_by_category_page("tech", PageRequest::new(1, 2))
    .await
    .unwrap();
  assert_eq!(page1.items.len(), 2);
  assert_eq!(page1.total_pages, 2);
  assert_eq!(page1.items[0].title, "tech 3");
  assert_eq!(page1.items[1].title, "tech 2");

  let page2 = s
    .list_posts_by_category_page("tech", PageRequest::new(2, 2))
    .await
    .unwrap();
  assert_eq!(page2.items.len(), 1);
  assert_eq!(page2.items[0].title, "tech 1");
}

#[tokio::test]
async fn category_match_is_case_insensitive() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  s.create_post(new_post(author, "one", "tech")).await.unwrap();

  let page = s
    .list_posts_by_category_page("TeCh", PageRequest::new(1, 10))
    .await
    .unwrap();
  assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn unknown_category_is_not_found_even_out_of_range() {
  let s = store().await;
  let err = s
    .list_posts_by_category_page("ghost", PageRequest::new(99, 10))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(_)));
}

// ─── Tagging ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tags_are_created_lazily_and_linked() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "tagged", "tech")).await.unwrap();

  s.tag_post(post.id, normalize_tags("Rust, Web")).await.unwrap();

  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.tags, vec!["rust", "web"]);
  assert_eq!(s.list_tags().await.unwrap().len(), 2);
}

#[tokio::test]
async fn tag_linking_is_idempotent() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "tagged", "tech")).await.unwrap();

  s.tag_post(post.id, normalize_tags("A, a , B")).await.unwrap();
  s.tag_post(post.id, normalize_tags("a,b")).await.unwrap();

  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.tags.len(), 2);
  assert_eq!(s.list_tags().await.unwrap().len(), 2);
}

#[tokio::test]
async fn whitespace_only_tag_input_links_nothing() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "bare", "tech")).await.unwrap();

  s.tag_post(post.id, normalize_tags("  ,  ")).await.unwrap();

  assert!(s.get_post(post.id).await.unwrap().unwrap().tags.is_empty());
  assert!(s.list_tags().await.unwrap().is_empty());
}

#[tokio::test]
async fn posts_by_tag_ordered_by_recent_tag_use() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let first = s.create_post(new_post(author, "first", "tech")).await.unwrap();
  let second = s.create_post(new_post(author, "second", "tech")).await.unwrap();

  // Tag the newer post first, then the older one: recent use wins.
  s.tag_post(second.id, vec!["rust".into()]).await.unwrap();
  s.tag_post(first.id, vec!["rust".into()]).await.unwrap();

  let page = s
    .list_posts_by_tag_page("rust", PageRequest::new(1, 10))
    .await
    .unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.items[0].id, first.id);
  assert_eq!(page.items[1].id, second.id);
}

#[tokio::test]
async fn tag_lookup_is_exact() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "p", "tech")).await.unwrap();
  s.tag_post(post.id, vec!["rust".into()]).await.unwrap();

  let err = s
    .list_posts_by_tag_page("Rust", PageRequest::new(1, 10))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TagNotFound(_)));
}

// ─── Thumb-ups ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn increment_thumb_counts_up() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "liked", "tech")).await.unwrap();

  assert_eq!(s.increment_thumb(post.id).await.unwrap(), 1);
  assert_eq!(s.increment_thumb(post.id).await.unwrap(), 2);
}

#[tokio::test]
async fn increment_thumb_missing_post_fails() {
  let s = store().await;
  let err = s.increment_thumb(7).await.unwrap_err();
  assert!(matches!(err, Error::PostNotFound(7)));
}

#[tokio::test]
async fn concurrent_thumb_ups_lose_no_updates() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "popular", "tech")).await.unwrap();

  let mut handles = Vec::new();
  for _ in 0..32 {
    let s = s.clone();
    let id = post.id;
    handles.push(tokio::spawn(async move { s.increment_thumb(id).await }));
  }
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let overview = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(overview.thumb_up, 32);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_comment_and_list() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "discussed", "tech")).await.unwrap();

  let first = s
    .add_comment(post.id, "first!".into(), author, None)
    .await
    .unwrap();
  s.add_comment(post.id, "reply".into(), author, Some(first.id))
    .await
    .unwrap();

  let page = s.list_comments_page(PageRequest::new(1, 10)).await.unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.items[0].body, "reply");
  assert_eq!(page.items[0].parent_id, Some(first.id));
  assert_eq!(page.items[0].post_title, "discussed");
}

#[tokio::test]
async fn comment_on_missing_post_fails() {
  let s = store().await;
  let author = seed_author(&s).await;
  let err = s
    .add_comment(404, "void".into(), author, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PostNotFound(404)));
}

#[tokio::test]
async fn reply_parent_must_be_on_same_post() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let a = s.create_post(new_post(author, "a", "tech")).await.unwrap();
  let b = s.create_post(new_post(author, "b", "tech")).await.unwrap();
  let on_a = s.add_comment(a.id, "root".into(), author, None).await.unwrap();

  let err = s
    .add_comment(b.id, "cross".into(), author, Some(on_a.id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ParentMismatch { .. }));

  let err = s
    .add_comment(b.id, "dangling".into(), author, Some(9999))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CommentNotFound(9999)));
}

// ─── Delete cascade ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_post_cascades_tagging_and_comments() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "doomed", "tech")).await.unwrap();
  s.tag_post(post.id, normalize_tags("rust,web")).await.unwrap();
  s.add_comment(post.id, "so long".into(), author, None)
    .await
    .unwrap();

  s.delete_post(post.id).await.unwrap();

  assert!(s.get_post(post.id).await.unwrap().is_none());
  let comments = s.list_comments_page(PageRequest::new(1, 10)).await.unwrap();
  assert_eq!(comments.total_count, 0);
  // The tag rows themselves survive; only the links are gone.
  assert_eq!(s.list_tags().await.unwrap().len(), 2);
  let by_tag = s
    .list_posts_by_tag_page("rust", PageRequest::new(1, 10))
    .await
    .unwrap();
  assert!(by_tag.items.is_empty());
}

#[tokio::test]
async fn delete_post_twice_fails_second_time() {
  let s = store().await;
  let author = seed_author(&s).await;
  s.create_category("tech").await.unwrap();
  let post = s.create_post(new_post(author, "once", "tech")).await.unwrap();

  s.delete_post(post.id).await.unwrap();
  let err = s.delete_post(post.id).await.unwrap_err();
  assert!(matches!(err, Error::PostNotFound(_)));
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn messages_listed_newest_first() {
  let s = store().await;
  let author = seed_author(&s).await;

  s.add_message("hi".into(), "first".into(), author).await.unwrap();
  s.add_message("again".into(), "second".into(), author)
    .await
    .unwrap();

  let messages = s.list_messages().await.unwrap();
  assert_eq!(messages.len(), 2);
  assert_eq!(messages[0].body, "second");
  assert_eq!(messages[0].author, "alice");
}

// ─── Users page ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_page_ordered_by_member_since_desc() {
  let s = store().await;
  for name in ["a", "b", "c"] {
    s.create_user(NewUser {
      username:      name.into(),
      password_hash: "x".into(),
      role:          Role::User,
    })
    .await
    .unwrap();
  }

  let page = s.list_users_page(PageRequest::new(1, 2)).await.unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.total_pages, 2);
  assert_eq!(page.items[0].username, "c");
}
