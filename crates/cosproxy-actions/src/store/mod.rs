//! The object storage seam used by the actions.
//!
//! Actions talk to storage only through [`ObjectStore`]. A [`StoreConnector`]
//! builds a store for each invocation from its resolved
//! [`ConnectionParams`], mirroring how every serverless invocation creates
//! its own client.

mod memory;
mod s3;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use cosproxy_core::ObjectLocation;

use crate::connection::ConnectionParams;

pub use memory::{MemoryConnector, MemoryObjectStore};
pub use s3::{S3Connector, S3ObjectStore};

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// Bucket name.
        bucket: String,
    },

    /// The object does not exist.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
    },

    /// Any other backend failure, carrying the backend's message.
    #[error("{0}")]
    Backend(String),
}

/// An object as returned by [`ObjectStore::get_object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object content.
    pub data: Bytes,
    /// Content type recorded for the object, if any.
    pub content_type: Option<String>,
    /// Entity tag.
    pub etag: Option<String>,
}

/// Acknowledgement of a successful [`ObjectStore::put_object`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutReceipt {
    /// Entity tag of the stored object.
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Version id, on versioned buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Read/write access to an object store.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Fetch an object.
    async fn get_object(&self, location: &ObjectLocation) -> Result<StoredObject, StoreError>;

    /// Store an object, replacing any existing one at the same location.
    async fn put_object(
        &self,
        location: &ObjectLocation,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutReceipt, StoreError>;
}

/// Builds an [`ObjectStore`] for one invocation.
pub trait StoreConnector: Send + Sync + fmt::Debug {
    /// Create a store for the given connection.
    fn connect(&self, params: &ConnectionParams) -> Arc<dyn ObjectStore>;
}
