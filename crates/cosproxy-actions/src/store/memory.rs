//! In-memory object store for local runs and tests.

use std::sync::Arc;

use bytes::Bytes;
use cosproxy_core::ObjectLocation;
use dashmap::{DashMap, DashSet};
use md5::{Digest, Md5};

use super::{ObjectStore, PutReceipt, StoreConnector, StoreError, StoredObject};
use crate::connection::ConnectionParams;

/// A thread-safe in-memory object store.
///
/// Buckets must exist before objects can be written to them, unless the store
/// was created with [`MemoryObjectStore::auto_create`].
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use cosproxy_actions::{MemoryObjectStore, ObjectStore};
/// use cosproxy_core::ObjectLocation;
///
/// # tokio_test::block_on(async {
/// let store = MemoryObjectStore::auto_create();
/// let location = ObjectLocation::new("photos", "cat.png").unwrap();
/// store
///     .put_object(&location, Bytes::from_static(b"meow"), Some("image/png"))
///     .await
///     .unwrap();
///
/// let object = store.get_object(&location).await.unwrap();
/// assert_eq!(object.data.as_ref(), b"meow");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: DashSet<String>,
    objects: DashMap<ObjectLocation, StoredObject>,
    auto_create_buckets: bool,
}

impl MemoryObjectStore {
    /// Create an empty store with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that creates buckets on first write.
    #[must_use]
    pub fn auto_create() -> Self {
        Self {
            auto_create_buckets: true,
            ..Self::default()
        }
    }

    /// Create a bucket. Creating an existing bucket is a no-op.
    pub fn create_bucket(&self, bucket: impl Into<String>) {
        self.buckets.insert(bucket.into());
    }

    /// Number of stored objects across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, location: &ObjectLocation) -> Result<StoredObject, StoreError> {
        if !self.buckets.contains(&location.bucket) {
            return Err(StoreError::NoSuchBucket {
                bucket: location.bucket.clone(),
            });
        }
        self.objects
            .get(location)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NoSuchKey {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
            })
    }

    async fn put_object(
        &self,
        location: &ObjectLocation,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutReceipt, StoreError> {
        if self.auto_create_buckets {
            self.create_bucket(location.bucket.clone());
        } else if !self.buckets.contains(&location.bucket) {
            return Err(StoreError::NoSuchBucket {
                bucket: location.bucket.clone(),
            });
        }

        let etag = format!("\"{}\"", hex::encode(Md5::digest(&data)));
        self.objects.insert(
            location.clone(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_owned),
                etag: Some(etag.clone()),
            },
        );

        Ok(PutReceipt {
            etag: Some(etag),
            version_id: None,
        })
    }
}

/// A connector that hands every invocation the same shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryObjectStore>,
}

impl MemoryConnector {
    /// Wrap an existing store.
    #[must_use]
    pub fn new(store: Arc<MemoryObjectStore>) -> Self {
        Self { store }
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryObjectStore> {
        &self.store
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, _params: &ConnectionParams) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store) as Arc<dyn ObjectStore>
    }
}
