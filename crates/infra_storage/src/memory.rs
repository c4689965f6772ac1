//! In-process object store

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use core_kernel::{DomainPort, PortError};
use domain_claims::ObjectStore;

use crate::error::StorageError;

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Bytes,
}

/// `ObjectStore` over a map keyed by `(bucket, key)`
///
/// Follows the same no-overwrite rule as the HTTP adapter, so the server
/// behaves the same when run without a configured bucket.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    base_url: String,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_base_url("memory://")
    }

    /// Store whose public URLs start with `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Reads an object back
    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys held in `bucket`, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for InMemoryObjectStore {}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), PortError> {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = (bucket.to_string(), key.to_string());

        if objects.contains_key(&slot) {
            return Err(StorageError::AlreadyExists(key.to_string()).into());
        }

        objects.insert(
            slot,
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}{}/{}", self.base_url, bucket, key)
    }
}
