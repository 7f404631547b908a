//! Download manager behaviour against an in-memory backend

mod common;

use common::{harness, Route};
use std::sync::Arc;
use std::time::Duration;
use storyspark_cache::{keys, BlobStore, CacheError, CacheResult, CacheStore, KeyValueStore};
use storyspark_core::{AppError, StoryId};
use storyspark_library::{Endpoints, MediaDownloadManager};
use storyspark_network::Method;

#[tokio::test]
async fn test_download_root_relative_ref() {
    let h = harness();
    h.transport.route(
        Method::Get,
        "/static/a.mp3",
        Route::Respond(200, b"ID3-audio".to_vec()),
    );
    let id = StoryId::from("s1");

    assert!(h.downloads.download(&id, "/static/a.mp3").await);

    let cached = h.downloads.cached_ref(&id).expect("cached ref after download");
    assert!(cached.as_str().starts_with("memory://"));
    assert_eq!(h.blobs.read(&id).unwrap().unwrap(), b"ID3-audio".to_vec());

    let state = h.downloads.download_state(&id).unwrap();
    assert_eq!(state.size_bytes, 9);
    assert_eq!(state.blob_ref, cached);
}

#[tokio::test]
async fn test_malformed_ref_fails_fast_and_keeps_prior_download() {
    let h = harness();
    h.transport.route(
        Method::Get,
        "/static/a.mp3",
        Route::Respond(200, b"first".to_vec()),
    );
    let id = StoryId::from("s1");
    assert!(h.downloads.download(&id, "/static/a.mp3").await);
    let before = h.downloads.cached_ref(&id);
    let requests = h.transport.request_count();

    assert!(!h.downloads.download(&id, "not-a-url").await);
    let err = h.downloads.try_download(&id, "not-a-url").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidReference { .. }));

    assert_eq!(h.transport.request_count(), requests);
    assert_eq!(h.downloads.cached_ref(&id), before);
    assert_eq!(h.blobs.read(&id).unwrap().unwrap(), b"first".to_vec());
}

#[tokio::test]
async fn test_empty_ref_is_invalid() {
    let h = harness();
    let err = h
        .downloads
        .try_download(&StoryId::from("s1"), "")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "No audio URL provided");
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn test_network_failure_returns_false_without_marker() {
    let h = harness();
    let id = StoryId::from("s2");

    assert!(!h.downloads.download(&id, "https://cdn.test/b.mp3").await);
    assert!(!h.downloads.is_downloaded(&id));
    assert!(h.downloads.cached_ref(&id).is_none());
    assert!(h.blobs.locate(&id).unwrap().is_none());
}

#[tokio::test]
async fn test_not_found_is_remote_error() {
    let h = harness();
    h.transport.route(
        Method::Get,
        "/static/missing.mp3",
        Route::Respond(404, br#"{"message":"Audio file not found"}"#.to_vec()),
    );

    let err = h
        .downloads
        .try_download(&StoryId::from("s3"), "/static/missing.mp3")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AppError::RemoteError {
            status: 404,
            message: "Audio file not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_remove_deletes_marker_and_blob() {
    let h = harness();
    h.transport
        .route(Method::Get, "/static/a.mp3", Route::Respond(200, b"x".to_vec()));
    let id = StoryId::from("s1");
    assert!(h.downloads.download(&id, "/static/a.mp3").await);

    h.downloads.remove(&id);

    assert!(!h.downloads.is_downloaded(&id));
    assert!(h.blobs.locate(&id).unwrap().is_none());
    assert!(!h.cache.contains(&keys::download(&id)));
}

#[tokio::test]
async fn test_marker_without_blob_is_not_a_cached_ref() {
    let h = harness();
    h.transport
        .route(Method::Get, "/static/a.mp3", Route::Respond(200, b"x".to_vec()));
    let id = StoryId::from("s1");
    assert!(h.downloads.download(&id, "/static/a.mp3").await);

    h.blobs.delete(&id).unwrap();
    assert!(h.downloads.is_downloaded(&id));
    assert!(h.downloads.cached_ref(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hung_fetch_times_out() {
    let h = harness();
    h.transport.route(Method::Get, "/static/slow.mp3", Route::Hang);

    let downloads = MediaDownloadManager::new(
        h.transport.clone(),
        Endpoints::new(common::BASE, "/api/stories", "/api/user/stories").unwrap(),
        h.cache.clone(),
        h.blobs.clone(),
    )
    .with_timeout(Duration::from_secs(5));

    let err = downloads
        .try_download(&StoryId::from("s1"), "/static/slow.mp3")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NetworkTimeout { seconds: 5, .. }));
    assert!(err.is_network_unavailable());
}

/// Accepts blob writes but refuses download markers
struct MarkerRejectingStore;

impl KeyValueStore for MarkerRejectingStore {
    fn read(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }
    fn write(&self, key: &str, _value: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable(format!("read-only: {}", key)))
    }
    fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_marker_write_failure_rolls_back_blob() {
    let h = harness();
    h.transport
        .route(Method::Get, "/static/a.mp3", Route::Respond(200, b"x".to_vec()));

    let downloads = MediaDownloadManager::new(
        h.transport.clone(),
        Endpoints::new(common::BASE, "/api/stories", "/api/user/stories").unwrap(),
        CacheStore::new(Arc::new(MarkerRejectingStore)),
        h.blobs.clone(),
    );
    let id = StoryId::from("s1");

    let err = downloads.try_download(&id, "/static/a.mp3").await.unwrap_err();
    assert!(matches!(err, AppError::CacheWriteFailed { .. }));
    assert!(h.blobs.locate(&id).unwrap().is_none());
    assert!(downloads.cached_ref(&id).is_none());
}
