//! AWS S3 media store.
//!
//! Objects are written to `{bucket}/{prefix}/{listing id}/{hash}.{ext}` and
//! addressed through the configured public base URL, or the bucket's
//! virtual-hosted endpoint when none is set.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use super::{MediaStore, object_key, public_uri};
use crate::config::MediaEnv;
use crate::error::{AppError, Result};
use crate::utils::http::download;

/// S3-based media store.
pub struct S3MediaStore {
    client: Client,
    http: reqwest::Client,
    bucket: String,
    prefix: String,
    public_base_url: String,
}

impl S3MediaStore {
    /// Create a new S3 media store.
    pub fn new(client: Client, http: reqwest::Client, env: MediaEnv, region: Option<String>) -> Self {
        let public_base_url = env.public_base_url.unwrap_or_else(|| match region {
            Some(region) => format!("https://{}.s3.{}.amazonaws.com", env.bucket, region),
            None => format!("https://{}.s3.amazonaws.com", env.bucket),
        });

        Self {
            client,
            http,
            bucket: env.bucket,
            prefix: env.prefix.trim_matches('/').to_string(),
            public_base_url,
        }
    }

    /// Create the store from environment credentials and check access.
    ///
    /// Fails when the bucket is not configured or not reachable with the
    /// resolved credentials, so a bad setup stops the run before scraping.
    pub async fn connect(env: MediaEnv, http: reqwest::Client) -> Result<Self> {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let region = sdk_config.region().map(|r| r.to_string());
        let client = Client::new(&sdk_config);

        client
            .head_bucket()
            .bucket(&env.bucket)
            .send()
            .await
            .map_err(|e| {
                AppError::config(format!(
                    "Cannot access media bucket '{}': {}",
                    env.bucket,
                    e.into_service_error()
                ))
            })?;

        log::info!("Media bucket s3://{} is reachable", env.bucket);
        Ok(Self::new(client, http, env, region))
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn upload(&self, source: &str, namespace: &str) -> Result<String> {
        let image = download(&self.http, source).await?;
        let key = self.full_key(&object_key(namespace, source));

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(image.bytes));
        if let Some(content_type) = image.content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::media(source, e.into_service_error()))?;

        log::debug!("Uploaded {} to s3://{}/{}", source, self.bucket, key);
        Ok(public_uri(&self.public_base_url, &key))
    }
}
