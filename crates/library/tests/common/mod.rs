//! Shared fixtures: an in-memory transport and wired-up services

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storyspark_cache::{BlobStore, CacheStore, MemoryBlobStore, MemoryStore};
use storyspark_library::{Endpoints, MediaDownloadManager, StoryCatalogService};
use storyspark_network::{
    HttpRequest, HttpResponse, Method, NetworkError, NetworkResult, StaticToken, Transport,
};

pub const BASE: &str = "http://stories.test";

#[derive(Clone)]
pub enum Route {
    Respond(u16, Vec<u8>),
    Unreachable,
    Hang,
}

/// Answers from a route table and records every request it sees
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: Method, path: &str, route: Route) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, format!("{}{}", BASE, path)), route);
    }

    pub fn json(&self, method: Method, path: &str, status: u16, body: &str) {
        self.route(method, path, Route::Respond(status, body.as_bytes().to_vec()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> NetworkResult<HttpResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.url.to_string()))
            .cloned();

        match route {
            Some(Route::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Route::Hang) => std::future::pending().await,
            Some(Route::Unreachable) | None => {
                Err(NetworkError::Unreachable(format!("no route to {}", request.url)))
            }
        }
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub store: Arc<MemoryStore>,
    pub cache: CacheStore,
    pub blobs: Arc<MemoryBlobStore>,
    pub tokens: Arc<StaticToken>,
    pub downloads: Arc<MediaDownloadManager>,
    pub catalog: StoryCatalogService,
}

pub fn harness() -> Harness {
    let transport = FakeTransport::new();
    let store = Arc::new(MemoryStore::new());
    let cache = CacheStore::new(store.clone());
    let blobs = Arc::new(MemoryBlobStore::new());
    let tokens = Arc::new(StaticToken::none());
    let endpoints = Endpoints::new(BASE, "/api/stories", "/api/user/stories").unwrap();

    let downloads = Arc::new(MediaDownloadManager::new(
        transport.clone(),
        endpoints.clone(),
        cache.clone(),
        blobs.clone() as Arc<dyn BlobStore>,
    ));
    let catalog = StoryCatalogService::new(
        transport.clone(),
        endpoints,
        cache.clone(),
        downloads.clone(),
        tokens.clone(),
    );

    Harness {
        transport,
        store,
        cache,
        blobs,
        tokens,
        downloads,
        catalog,
    }
}
