//! Supabase Storage adapter
//!
//! Uploads go to `POST {url}/storage/v1/object/{bucket}/{key}` authenticated
//! with the service key, both as a bearer token and as the `apikey` header.
//! Objects are never overwritten (`x-upsert: false`); the store answers 409
//! or 400 "Duplicate" for an existing key.
//!
//! # Example
//!
//! ```rust,ignore
//! let storage = SupabaseStorage::new(SupabaseConfig::new(
//!     "https://project.supabase.co",
//!     service_key,
//! ))?;
//! storage.upload("images", "front_bumper.jpg", "image/jpeg", bytes).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, PortError};
use domain_claims::ObjectStore;

use crate::error::StorageError;

/// Connect timeout (TCP handshake + TLS)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total time allowed for one upload
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Supabase project
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service role or anon key
    pub key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// `ObjectStore` backed by Supabase Storage
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    /// Builds the HTTP client
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Client` if the TLS backend cannot be initialised.
    pub fn new(config: SupabaseConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StorageError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Endpoint an object is uploaded to
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.config.url, bucket, key)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT
            || (status == StatusCode::BAD_REQUEST && body.contains("Duplicate"))
        {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl DomainPort for SupabaseStorage {}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), PortError> {
        match self.put_object(bucket, key, content_type, bytes).await {
            Ok(()) => {
                debug!("Object uploaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Object upload failed");
                Err(e.into())
            }
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.config.url, bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SupabaseStorage {
        SupabaseStorage::new(SupabaseConfig::new("https://project.supabase.co/", "secret")).unwrap()
    }

    #[test]
    fn test_urls() {
        let storage = storage();

        assert_eq!(
            storage.object_url("images", "dent.png"),
            "https://project.supabase.co/storage/v1/object/images/dent.png"
        );
        assert_eq!(
            storage.public_url("images", "dent.png"),
            "https://project.supabase.co/storage/v1/object/public/images/dent.png"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", storage());
        assert!(!debug.contains("secret"));
    }
}
