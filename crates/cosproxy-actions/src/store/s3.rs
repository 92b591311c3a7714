//! S3-compatible remote object store backed by `aws-sdk-s3`.

use std::sync::Arc;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use cosproxy_core::ObjectLocation;
use tracing::debug;

use super::{ObjectStore, PutReceipt, StoreConnector, StoreError, StoredObject};
use crate::connection::ConnectionParams;

/// Provider name attached to the static credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "cosproxy";

/// An [`ObjectStore`] talking to an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client for the given connection.
    #[must_use]
    pub fn connect(params: &ConnectionParams, force_path_style: bool) -> Self {
        let creds = Credentials::new(
            params.keys.access_key_id.clone(),
            params.keys.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(params.region.clone()))
            .credentials_provider(creds)
            .endpoint_url(params.endpoint.as_str())
            .force_path_style(force_path_style)
            .build();

        debug!(
            endpoint = %params.endpoint,
            region = %params.region,
            service_instance_id = ?params.service_instance_id,
            "created object storage client"
        );

        Self::new(aws_sdk_s3::Client::from_conf(config))
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, location: &ObjectLocation) -> Result<StoredObject, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| map_sdk_error(&e, location))?;

        let content_type = output.content_type().map(str::to_owned);
        let etag = output.e_tag().map(str::to_owned);
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to read object body: {e}")))?
            .into_bytes();

        Ok(StoredObject {
            data,
            content_type,
            etag,
        })
    }

    async fn put_object(
        &self,
        location: &ObjectLocation,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutReceipt, StoreError> {
        let output = self
            .client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .set_content_type(content_type.map(str::to_owned))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| map_sdk_error(&e, location))?;

        Ok(PutReceipt {
            etag: output.e_tag().map(str::to_owned),
            version_id: output.version_id().map(str::to_owned),
        })
    }
}

/// Map an SDK failure to a [`StoreError`], keeping the backend's message.
fn map_sdk_error<E, R>(err: &SdkError<E, R>, location: &ObjectLocation) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error().and_then(ProvideErrorMetadata::code) {
        Some("NoSuchBucket") => StoreError::NoSuchBucket {
            bucket: location.bucket.clone(),
        },
        Some("NoSuchKey") => StoreError::NoSuchKey {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        },
        _ => StoreError::Backend(DisplayErrorContext(err).to_string()),
    }
}

/// A connector creating one [`S3ObjectStore`] per invocation.
#[derive(Debug, Clone)]
pub struct S3Connector {
    force_path_style: bool,
}

impl S3Connector {
    /// Create a connector.
    #[must_use]
    pub fn new(force_path_style: bool) -> Self {
        Self { force_path_style }
    }
}

impl Default for S3Connector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StoreConnector for S3Connector {
    fn connect(&self, params: &ConnectionParams) -> Arc<dyn ObjectStore> {
        Arc::new(S3ObjectStore::connect(params, self.force_path_style))
    }
}
