//! StorySpark story library
//!
//! [`StoryCatalogService`] serves story lists with an offline fallback;
//! [`MediaDownloadManager`] keeps audio around for playback without a
//! network. Both get their storage and transport injected.

mod catalog;
mod download;
mod endpoints;
mod remote;

pub use catalog::StoryCatalogService;
pub use download::MediaDownloadManager;
pub use endpoints::Endpoints;

use std::sync::Arc;
use storyspark_cache::{BlobStore, CacheStore};
use storyspark_config::NetworkConfig;
use storyspark_core::Result;
use storyspark_network::{TokenProvider, Transport};

/// Wires a catalog service and its download manager from configuration
pub fn build_services(
    config: &NetworkConfig,
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    blobs: Arc<dyn BlobStore>,
    tokens: Arc<dyn TokenProvider>,
) -> Result<StoryCatalogService> {
    let endpoints = Endpoints::from_config(config)?;
    let downloads = Arc::new(
        MediaDownloadManager::new(transport.clone(), endpoints.clone(), cache.clone(), blobs)
            .with_timeout(config.request_timeout()),
    );

    Ok(
        StoryCatalogService::new(transport, endpoints, cache, downloads, tokens)
            .with_timeout(config.request_timeout()),
    )
}
