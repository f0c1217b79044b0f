//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {file_name}           # Listings array (default listings.json)
//! └── stats.json            # Run report
//! ```
//!
//! Every write replaces the previous document wholesale.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{EnrichedListing, OutputConfig};
use crate::storage::{ListingStorage, REPORT_FILE_NAME, RunReport, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_name: String,
}

impl LocalStorage {
    /// Create a new LocalStorage writing `file_name` under `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Storage for the configured output location.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.dir.clone(), output.file_name.clone())
    }

    /// Storage writing exactly `path`; the report goes next to it.
    pub fn at_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::config(format!("Invalid output file: {path:?}")))?;
        if file_name == REPORT_FILE_NAME {
            return Err(AppError::config(format!(
                "Output file cannot be named {REPORT_FILE_NAME}, the run report uses that name"
            )));
        }
        let root_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Ok(Self::new(root_dir, file_name))
    }

    /// Full path of the listings document.
    pub fn listings_path(&self) -> PathBuf {
        self.path(&self.file_name)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ListingStorage for LocalStorage {
    async fn write_listings(&self, listings: &[EnrichedListing]) -> Result<WriteMetadata> {
        if self.file_name == REPORT_FILE_NAME {
            return Err(AppError::config(format!(
                "Listings would overwrite the run report {REPORT_FILE_NAME}"
            )));
        }
        let path = self.write_json(&self.file_name, listings).await?;
        log::info!("{} listings written to {}", listings.len(), path.display());

        Ok(WriteMetadata {
            count: listings.len(),
            location: path.display().to_string(),
            timestamp: Utc::now(),
        })
    }

    async fn load_listings(&self) -> Result<Vec<EnrichedListing>> {
        match self.read_json(&self.file_name).await? {
            Some(listings) => Ok(listings),
            None => {
                log::warn!("No {} found", self.file_name);
                Ok(Vec::new())
            }
        }
    }

    async fn write_report(&self, report: &RunReport) -> Result<()> {
        self.write_json(REPORT_FILE_NAME, report).await?;
        Ok(())
    }

    async fn load_report(&self) -> Result<Option<RunReport>> {
        self.read_json(REPORT_FILE_NAME).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStub;
    use tempfile::TempDir;

    fn listing(id: &str, condition: Option<&str>) -> EnrichedListing {
        EnrichedListing {
            stub: ListingStub {
                id: id.to_string(),
                title: format!("Chaqueta {id}"),
                url: format!("https://es.wallapop.com/item/chaqueta-{id}"),
                price: "60 €".to_string(),
            },
            description: "Chaqueta de cordura con protecciones".to_string(),
            condition: condition.map(str::to_string),
            reserved: false,
            images: vec![format!("https://cdn.wallapop.com/images/{id}/1.jpg")],
            category: Some("motorbike_gear".to_string()),
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "out.json");

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "out.json");

        assert!(storage.read_bytes("nope.txt").await.unwrap().is_none());
        assert!(storage.load_listings().await.unwrap().is_empty());
        assert!(storage.load_report().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listings_reload_identically() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested/results"), "listings.json");
        let listings = vec![listing("a", Some("Como nuevo")), listing("b", None)];

        let meta = storage.write_listings(&listings).await.unwrap();

        assert_eq!(meta.count, 2);
        assert!(storage.listings_path().exists());
        assert_eq!(storage.load_listings().await.unwrap(), listings);
    }

    #[tokio::test]
    async fn test_empty_result_still_written() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "listings.json");

        storage.write_listings(&[]).await.unwrap();

        let raw = std::fs::read_to_string(storage.listings_path()).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[tokio::test]
    async fn test_write_replaces_previous_document() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "listings.json");

        storage
            .write_listings(&[listing("a", None), listing("b", None)])
            .await
            .unwrap();
        storage.write_listings(&[listing("c", None)]).await.unwrap();

        let loaded = storage.load_listings().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), "c");
        assert!(!tmp.path().join("listings.tmp").exists());
    }

    #[tokio::test]
    async fn test_report_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "listings.json");
        let report = RunReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            source_url: "https://es.wallapop.com/app/search?keywords=casco".to_string(),
            category: None,
            stub_count: 10,
            listing_count: 2,
            stopped_early: true,
            reason: Some("Required field 'carousel' missing".to_string()),
        };

        storage.write_report(&report).await.unwrap();

        assert_eq!(storage.load_report().await.unwrap(), Some(report));
    }

    #[test]
    fn test_at_path() {
        let storage = LocalStorage::at_path(Path::new("out/gear.json")).unwrap();
        assert_eq!(storage.listings_path(), Path::new("out/gear.json"));

        let bare = LocalStorage::at_path(Path::new("gear.json")).unwrap();
        assert_eq!(bare.listings_path(), Path::new("./gear.json"));

        assert!(LocalStorage::at_path(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_listings_never_share_the_report_file() {
        let tmp = TempDir::new().unwrap();

        let err = LocalStorage::at_path(&tmp.path().join(REPORT_FILE_NAME)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let storage = LocalStorage::new(tmp.path(), REPORT_FILE_NAME);
        assert!(storage.write_listings(&[]).await.is_err());
        assert!(!tmp.path().join(REPORT_FILE_NAME).exists());
    }
}
