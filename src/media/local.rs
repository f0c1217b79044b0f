//! Local filesystem media store.
//!
//! Downloads each image and writes it below a root directory. Useful for
//! development and for serving images from a static host.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{MediaStore, object_key, public_uri};
use crate::error::{AppError, Result};
use crate::utils::http::download;

/// Media store writing into a local directory.
#[derive(Clone)]
pub struct LocalMediaStore {
    client: reqwest::Client,
    root_dir: PathBuf,
    public_base_url: Option<String>,
}

impl LocalMediaStore {
    pub fn new(
        client: reqwest::Client,
        root_dir: impl Into<PathBuf>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            root_dir: root_dir.into(),
            public_base_url,
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    ///
    /// Concurrent writes of the same key each use their own temp file; the
    /// last rename wins.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.root_dir.join(key);
        ensure_parent(&path).await?;

        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// URI handed back for a stored key.
    fn uri_for(&self, key: &str, path: &Path) -> String {
        match &self.public_base_url {
            Some(base) => public_uri(base, key),
            None => path.to_string_lossy().into_owned(),
        }
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, source: &str, namespace: &str) -> Result<String> {
        let image = download(&self.client, source).await?;
        let key = object_key(namespace, source);
        let path = self
            .write_bytes(&key, &image.bytes)
            .await
            .map_err(|e| AppError::media(source, e))?;

        log::debug!("Stored {} at {}", source, path.display());
        Ok(self.uri_for(&key, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaRehost;
    use tempfile::TempDir;

    fn store(root: &Path, base: Option<&str>) -> LocalMediaStore {
        LocalMediaStore::new(reqwest::Client::new(), root, base.map(str::to_string))
    }

    #[tokio::test]
    async fn test_write_bytes_creates_namespace_dir() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path(), None);

        let path = store.write_bytes("listing-1/abc.jpg", b"\xFF\xD8\xFF").await.unwrap();

        assert_eq!(path, tmp.path().join("listing-1/abc.jpg"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\xFF\xD8\xFF");
        assert_eq!(leftover_tmp_files(&tmp.path().join("listing-1")), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_of_same_key() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path(), None);
        let body = vec![0xAB; 256 * 1024];

        let writes = (0..8).map(|_| store.write_bytes("listing-1/abc.jpg", &body));
        let paths = futures::future::try_join_all(writes).await.unwrap();

        assert!(paths.iter().all(|p| p == &tmp.path().join("listing-1/abc.jpg")));
        assert_eq!(tokio::fs::read(&paths[0]).await.unwrap(), body);
        assert_eq!(leftover_tmp_files(&tmp.path().join("listing-1")), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_carousel_image_rehosts() {
        let body = vec![0xFF; 200 * 1024];
        let source = format!("{}/img/1.jpg", serve_image(body.clone()).await);
        let tmp = TempDir::new().unwrap();
        let media = MediaRehost::store(store(tmp.path(), Some("https://img.example.com")));

        for _ in 0..10 {
            let images = vec![source.clone(), source.clone(), source.clone()];
            let uris = media.rehost(&images, "listing-1").await.unwrap();

            let expected = format!("https://img.example.com/{}", object_key("listing-1", &source));
            assert_eq!(uris, vec![expected.clone(), expected.clone(), expected]);
        }

        let stored = tmp.path().join(object_key("listing-1", &source));
        assert_eq!(tokio::fs::read(stored).await.unwrap(), body);
        assert_eq!(leftover_tmp_files(&tmp.path().join("listing-1")), 0);
    }

    fn leftover_tmp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                let name = entry.as_ref().unwrap().file_name();
                name.to_string_lossy().ends_with(".tmp")
            })
            .count()
    }

    /// Serve `body` as a JPEG for every request; returns the base URL.
    async fn serve_image(body: Vec<u8>) -> String {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = [0u8; 2048];
                    let _ = socket.read(&mut request).await;
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_uri_for() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listing-1/abc.jpg");

        let with_base = store(tmp.path(), Some("https://img.example.com/"));
        assert_eq!(
            with_base.uri_for("listing-1/abc.jpg", &path),
            "https://img.example.com/listing-1/abc.jpg"
        );

        let without_base = store(tmp.path(), None);
        assert_eq!(
            without_base.uri_for("listing-1/abc.jpg", &path),
            path.to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_upload_of_unreachable_source_fails() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path(), None);

        let err = store
            .upload("http://127.0.0.1:9/missing.jpg", "listing-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Media { .. }));
        assert!(!tmp.path().join("listing-1").exists());
    }
}
