//! Image re-hosting.
//!
//! Listing images point at the marketplace CDN. When re-hosting is on, each
//! image is copied into a store we own and the listing keeps the stored
//! URI instead:
//!
//! ```text
//! {store}/
//! └── {listing id}/
//!     ├── 3a7bd3e2360a3d29.jpg
//!     └── 9f86d081884c7d65.webp
//! ```
//!
//! Uploads for one listing run concurrently and are joined. If any of them
//! fails the listing fails; objects already written are left in place
//! (uploads are at-least-once, never rolled back).

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use sha2::{Digest, Sha256};

#[cfg(feature = "s3")]
use crate::config::MediaEnv;
use crate::error::Result;
#[cfg(not(feature = "s3"))]
use crate::error::AppError;
use crate::models::{Config, MediaBackend};
use crate::utils::http::create_async_client;

pub use local::LocalMediaStore;
#[cfg(feature = "s3")]
pub use s3::S3MediaStore;

/// Extensions kept as-is in object keys; anything else is stored as `.jpg`.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// An externally owned store for listing images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store name for logging.
    fn name(&self) -> &'static str;

    /// Copy `source` into the store under `namespace`, returning its stable URI.
    async fn upload(&self, source: &str, namespace: &str) -> Result<String>;
}

/// Re-hosting mode for a run.
#[derive(Clone)]
pub enum MediaRehost {
    /// Keep source URIs (dry runs)
    PassThrough,
    /// Upload every image to the store
    Store(Arc<dyn MediaStore>),
}

impl MediaRehost {
    pub fn store(store: impl MediaStore + 'static) -> Self {
        Self::Store(Arc::new(store))
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }

    /// Re-host `images` under `namespace`, preserving order.
    pub async fn rehost(&self, images: &[String], namespace: &str) -> Result<Vec<String>> {
        let store = match self {
            Self::PassThrough => return Ok(images.to_vec()),
            Self::Store(store) => store,
        };

        if images.is_empty() {
            return Ok(Vec::new());
        }

        log::info!(
            "Uploading {} images for {} to {} store",
            images.len(),
            namespace,
            store.name()
        );

        let uploads = images.iter().map(|source| store.upload(source, namespace));
        let uris = try_join_all(uploads).await.inspect_err(|e| {
            log::warn!(
                "Upload batch for {} failed, earlier objects in {}/ are kept: {}",
                namespace,
                namespace,
                e
            );
        })?;

        Ok(uris)
    }
}

/// Build the re-hosting mode for a run.
///
/// `bypass` (the `--no-rehost` flag) or `media.enabled = false` keeps
/// source URIs. Store credentials are checked here, before scraping starts.
pub async fn create_rehost(config: &Config, bypass: bool) -> Result<MediaRehost> {
    if bypass || !config.media.enabled {
        log::info!("Image re-hosting disabled, keeping source URIs");
        return Ok(MediaRehost::PassThrough);
    }

    let http = create_async_client(&config.scraper)?;
    match config.media.backend {
        MediaBackend::Local => {
            log::info!(
                "Re-hosting images into {}",
                config.media.local_dir.display()
            );
            Ok(MediaRehost::store(LocalMediaStore::new(
                http,
                config.media.local_dir.clone(),
                config.media.public_base_url.clone(),
            )))
        }
        #[cfg(feature = "s3")]
        MediaBackend::S3 => {
            let mut env = MediaEnv::from_env()?;
            if env.public_base_url.is_none() {
                env.public_base_url = config.media.public_base_url.clone();
            }
            Ok(MediaRehost::store(S3MediaStore::connect(env, http).await?))
        }
        #[cfg(not(feature = "s3"))]
        MediaBackend::S3 => Err(AppError::config(
            "media.backend = \"s3\" requires the 's3' feature",
        )),
    }
}

/// Object key for `source` within `namespace`.
///
/// The file name is derived from the source URI, so re-uploading the same
/// image overwrites the same object.
pub fn object_key(namespace: &str, source: &str) -> String {
    let digest = hex::encode(Sha256::digest(source.as_bytes()));
    format!("{}/{}.{}", namespace, &digest[..16], extension(source))
}

fn extension(source: &str) -> String {
    let path = url::Url::parse(source)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| source.to_string());

    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Join a public base URL and an object key.
pub(crate) fn public_uri(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
