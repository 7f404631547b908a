//! Catalog service behaviour against an in-memory backend

mod common;

use common::{harness, Route};
use storyspark_cache::keys;
use storyspark_core::{AppError, Story, StoryId};
use storyspark_network::Method;

const CATALOG_JSON: &str = r#"[
    {"id": 1, "title": "The Brave Little Star", "theme": "space", "duration": "5 minutes",
     "ageGroup": "3-5", "text": "A happy star.", "audioRef": "/static/star.mp3"},
    {"id": "2", "title": "Moon Bear", "audio_path": "/static/bear.mp3", "created_at": "2024-01-15T10:30:00"}
]"#;

fn seed_cache(h: &common::Harness, stories: &[Story]) {
    h.cache.set(keys::CATALOG, stories);
}

#[tokio::test]
async fn test_fetch_success_refreshes_cache() {
    let h = harness();
    h.transport.json(Method::Get, "/api/stories", 200, CATALOG_JSON);

    let stories = h.catalog.fetch_catalog().await;

    assert_eq!(stories.len(), 2);
    assert_eq!(stories[0].id, StoryId::from("1"));
    assert_eq!(stories[1].audio_ref.as_deref(), Some("/static/bear.mp3"));
    assert!(stories[1].created_at.is_some());
    assert_eq!(h.catalog.cached_stories(), stories);
}

#[tokio::test]
async fn test_server_error_falls_back_to_cache_unchanged() {
    let h = harness();
    let prior = vec![Story::new(StoryId::from(1u64), "A")];
    seed_cache(&h, &prior);
    let raw_before = h.cache.get::<serde_json::Value>(keys::CATALOG);
    h.transport
        .json(Method::Get, "/api/stories", 500, r#"{"message":"boom"}"#);

    let stories = h.catalog.fetch_catalog().await;

    assert_eq!(stories, prior);
    assert_eq!(h.cache.get::<serde_json::Value>(keys::CATALOG), raw_before);
}

#[tokio::test]
async fn test_unreachable_with_empty_cache_is_empty() {
    let h = harness();
    h.transport.route(Method::Get, "/api/stories", Route::Unreachable);
    assert!(h.catalog.fetch_catalog().await.is_empty());
}

#[tokio::test]
async fn test_undecodable_body_falls_back() {
    let h = harness();
    seed_cache(&h, &[Story::new("7", "Cached")]);
    h.transport
        .json(Method::Get, "/api/stories", 200, "<html>captive portal</html>");

    let stories = h.catalog.fetch_catalog().await;
    assert_eq!(stories[0].title, "Cached");
}

#[tokio::test(start_paused = true)]
async fn test_hung_catalog_falls_back() {
    let h = harness();
    seed_cache(&h, &[Story::new("7", "Cached")]);
    h.transport.route(Method::Get, "/api/stories", Route::Hang);

    let stories = h.catalog.fetch_catalog().await;
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn test_fetch_reconciles_download_markers() {
    let h = harness();
    h.transport.json(Method::Get, "/api/stories", 200, CATALOG_JSON);
    h.transport.route(
        Method::Get,
        "/static/bear.mp3",
        Route::Respond(200, b"bear".to_vec()),
    );
    assert!(h.downloads.download(&StoryId::from("2"), "/static/bear.mp3").await);

    let stories = h.catalog.fetch_catalog().await;
    assert!(!stories[0].is_downloaded);
    assert!(stories[1].is_downloaded);
}

#[test]
fn test_mark_unmark_round_trip() {
    let h = harness();
    let mut other = Story::new("b", "Other");
    other.is_downloaded = true;
    let prior = vec![Story::new("a", "Target"), other.clone(), Story::new("c", "Third")];
    seed_cache(&h, &prior);

    let marked = h.catalog.mark_downloaded(&StoryId::from("a"));
    assert!(marked[0].is_downloaded);

    let restored = h.catalog.unmark_downloaded(&StoryId::from("a"));
    assert!(!restored[0].is_downloaded);
    assert_eq!(restored[1], other);
    assert_eq!(restored[2], prior[2]);
    assert_eq!(h.catalog.cached_stories(), restored);
}

#[test]
fn test_mark_is_idempotent() {
    let h = harness();
    seed_cache(&h, &[Story::new("a", "A"), Story::new("b", "B")]);

    let once = h.catalog.mark_downloaded(&StoryId::from("a"));
    let twice = h.catalog.mark_downloaded(&StoryId::from("a"));
    assert_eq!(once, twice);
}

#[test]
fn test_mark_unknown_id_is_noop() {
    let h = harness();
    let prior = vec![Story::new("a", "A")];
    seed_cache(&h, &prior);

    assert_eq!(h.catalog.mark_downloaded(&StoryId::from("zzz")), prior);
    assert!(h.catalog.downloaded_stories().is_empty());
}

#[tokio::test]
async fn test_save_and_remove_offline() {
    let h = harness();
    seed_cache(&h, &[Story::new("a", "A")]);
    h.transport
        .route(Method::Get, "/static/a.mp3", Route::Respond(200, b"a".to_vec()));

    let story = Story::new("a", "A").with_audio_ref("/static/a.mp3");
    assert!(h.catalog.save_for_offline(&story).await);
    assert_eq!(h.catalog.downloaded_stories().len(), 1);

    let local = h.catalog.resolve_playback_ref(&story).unwrap();
    assert!(local.starts_with("memory://"));

    let after = h.catalog.remove_offline(&story.id);
    assert!(!after[0].is_downloaded);
    assert_eq!(
        h.catalog.resolve_playback_ref(&story).as_deref(),
        Some("/static/a.mp3")
    );
}

#[tokio::test]
async fn test_save_for_offline_without_audio_fails() {
    let h = harness();
    assert!(!h.catalog.save_for_offline(&Story::new("x", "Silent")).await);
    assert!(h.catalog.cached_stories().is_empty());
    assert!(h.catalog.resolve_playback_ref(&Story::new("x", "Silent")).is_none());
}

#[tokio::test]
async fn test_user_stories_require_token_before_network() {
    let h = harness();
    let err = h.catalog.list_user_stories().await.unwrap_err();
    assert_eq!(err, AppError::Unauthenticated);
    assert_eq!(h.transport.request_count(), 0);

    let err = h.catalog.delete_story(&StoryId::from("1")).await.unwrap_err();
    assert_eq!(err, AppError::Unauthenticated);
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn test_user_stories_send_bearer() {
    let h = harness();
    h.tokens.set(Some("tok-123".to_string()));
    h.transport.json(
        Method::Get,
        "/api/user/stories",
        200,
        r#"{"stories":[{"id":5,"title":"Mine","content":"Once upon a time"}]}"#,
    );

    let stories = h.catalog.list_user_stories().await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].text, "Once upon a time");
    assert_eq!(h.transport.requests()[0].bearer.as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn test_user_story_detail() {
    let h = harness();
    h.tokens.set(Some("tok".to_string()));
    h.transport.json(
        Method::Get,
        "/api/user/stories/5",
        200,
        r#"{"story":{"id":5,"title":"Mine"}}"#,
    );

    let story = h.catalog.get_user_story(&StoryId::from("5")).await.unwrap();
    assert_eq!(story.title, "Mine");
}

#[tokio::test]
async fn test_remote_error_is_surfaced_verbatim() {
    let h = harness();
    h.tokens.set(Some("tok".to_string()));
    h.transport.json(
        Method::Get,
        "/api/user/stories",
        403,
        r#"{"message":"Account suspended"}"#,
    );

    let err = h.catalog.list_user_stories().await.unwrap_err();
    assert_eq!(
        err,
        AppError::RemoteError {
            status: 403,
            message: "Account suspended".to_string()
        }
    );
}

#[tokio::test]
async fn test_delete_prunes_cache_and_download() {
    let h = harness();
    h.tokens.set(Some("tok".to_string()));
    seed_cache(&h, &[Story::new("1", "Gone"), Story::new("2", "Kept")]);
    h.transport
        .route(Method::Get, "/static/1.mp3", Route::Respond(200, b"1".to_vec()));
    h.transport.json(Method::Delete, "/api/user/stories/1", 200, "{}");
    let id = StoryId::from("1");
    assert!(h.downloads.download(&id, "/static/1.mp3").await);

    h.catalog.delete_story(&id).await.unwrap();

    let remaining = h.catalog.cached_stories();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Kept");
    assert!(!h.downloads.is_downloaded(&id));
}

#[tokio::test]
async fn test_failed_delete_keeps_cache() {
    let h = harness();
    h.tokens.set(Some("tok".to_string()));
    seed_cache(&h, &[Story::new("1", "Still here")]);
    h.transport.json(
        Method::Delete,
        "/api/user/stories/1",
        404,
        r#"{"message":"Story not found"}"#,
    );

    let err = h.catalog.delete_story(&StoryId::from("1")).await.unwrap_err();
    assert_eq!(err.user_message(), "Story not found");
    assert_eq!(h.catalog.cached_stories().len(), 1);
}
