//! The read action: fetch one object and shape it into a web response.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use cosproxy_core::{ObjectLocation, ProxyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::args::ActionArgs;
use crate::connection::ConnectionParams;
use crate::error::{ActionError, ActionFailure, READ_PARAMS_REQUIRED};
use crate::media::{DEFAULT_CONTENT_TYPE, is_binary};
use crate::store::StoreConnector;

/// Successful result of the read action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutput {
    /// Bucket the object was read from.
    pub bucket: String,
    /// Key of the object.
    pub key: String,
    /// Response headers; carries the object's `content-type`.
    pub headers: BTreeMap<String, String>,
    /// Object content: UTF-8 text, or base64 for binary content types.
    pub body: String,
    /// Whether [`body`](Self::body) is base64.
    #[serde(skip)]
    pub base64_encoded: bool,
}

/// `{"bucket": .., "key": ..}` sent as the request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReadTarget {
    bucket: Option<String>,
    key: Option<String>,
}

/// Determine the object to read: explicit arguments first, then the JSON body.
fn read_target(args: &ActionArgs) -> Result<ReadTarget, ActionError> {
    if let (Some(bucket), Some(key)) = (&args.bucket, &args.key) {
        return Ok(ReadTarget {
            bucket: Some(bucket.clone()),
            key: Some(key.clone()),
        });
    }

    match args.decoded_body()? {
        Some(raw) => serde_json::from_slice(&raw)
            .map_err(|e| ActionError::InvalidArguments(format!("request body is not a JSON target: {e}"))),
        None => Ok(ReadTarget::default()),
    }
}

/// Read an object from storage.
///
/// # Errors
/// Returns the failure result object when the bucket, key, or credentials
/// are missing, or when the store rejects the read.
pub async fn read_object(
    args: &ActionArgs,
    config: &ProxyConfig,
    connector: &dyn StoreConnector,
) -> Result<ReadOutput, ActionFailure> {
    let target = read_target(args).map_err(|e| ActionFailure::new(&e, None, None))?;
    let bucket = target.bucket.filter(|b| !b.is_empty());
    let key = target.key.filter(|k| !k.is_empty());
    let fail = |e: ActionError| ActionFailure::new(&e, bucket.clone(), key.clone());

    let connection = ConnectionParams::resolve(args, config).map_err(fail)?;
    let (Some(b), Some(k), Some(connection)) = (&bucket, &key, connection) else {
        return Err(fail(ActionError::MissingParameters(READ_PARAMS_REQUIRED)));
    };
    let location = ObjectLocation::new(b.as_str(), k.as_str()).map_err(|e| fail(e.into()))?;

    debug!(%location, "reading object");
    let store = connector.connect(&connection);
    let object = store.get_object(&location).await.map_err(|e| {
        warn!(%location, error = %e, "object read failed");
        fail(e.into())
    })?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());
    let base64_encoded = is_binary(&content_type);
    let body = if base64_encoded {
        BASE64_STANDARD.encode(&object.data)
    } else {
        String::from_utf8_lossy(&object.data).into_owned()
    };

    debug!(%location, %content_type, bytes = object.data.len(), base64_encoded, "read object");

    Ok(ReadOutput {
        bucket: location.bucket,
        key: location.key,
        headers: BTreeMap::from([("content-type".to_owned(), content_type)]),
        body,
        base64_encoded,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::store::{MemoryConnector, MemoryObjectStore, ObjectStore};

    fn config() -> ProxyConfig {
        ProxyConfig::builder()
            .access_key_id("AK".into())
            .secret_access_key("SK".into())
            .build()
    }

    async fn seeded_connector() -> MemoryConnector {
        let store = Arc::new(MemoryObjectStore::new());
        store.create_bucket("docs");
        let put = |key: &'static str, data: &'static [u8], ct: &'static str| {
            let store = Arc::clone(&store);
            async move {
                store
                    .put_object(
                        &ObjectLocation::new("docs", key).unwrap(),
                        Bytes::from_static(data),
                        Some(ct),
                    )
                    .await
                    .expect("seed object");
            }
        };
        put("note.txt", b"hello world", "text/plain").await;
        put("logo.png", b"\x89PNG\r\n", "image/png").await;
        MemoryConnector::new(store)
    }

    #[tokio::test]
    async fn test_should_read_text_object_from_arguments() {
        let connector = seeded_connector().await;
        let args = ActionArgs::from_value(json!({ "bucket": "docs", "key": "note.txt" })).unwrap();

        let out = read_object(&args, &config(), &connector).await.expect("read succeeds");
        assert_eq!(out.body, "hello world");
        assert!(!out.base64_encoded);
        assert_eq!(out.headers["content-type"], "text/plain");

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            json!({
                "bucket": "docs",
                "key": "note.txt",
                "headers": { "content-type": "text/plain" },
                "body": "hello world",
            })
        );
    }

    #[tokio::test]
    async fn test_should_base64_encode_binary_object() {
        let connector = seeded_connector().await;
        let args = ActionArgs::from_value(json!({ "bucket": "docs", "key": "logo.png" })).unwrap();

        let out = read_object(&args, &config(), &connector).await.expect("read succeeds");
        assert!(out.base64_encoded);
        assert_eq!(BASE64_STANDARD.decode(&out.body).unwrap(), b"\x89PNG\r\n");
    }

    #[tokio::test]
    async fn test_should_read_target_from_web_body() {
        let connector = seeded_connector().await;
        let args = ActionArgs {
            body: Some(BASE64_STANDARD.encode(br#"{"bucket":"docs","key":"note.txt"}"#)),
            ..ActionArgs::default()
        };

        let out = read_object(&args, &config(), &connector).await.expect("read succeeds");
        assert_eq!(out.key, "note.txt");
    }

    #[tokio::test]
    async fn test_should_require_bucket_key_and_credentials() {
        let connector = seeded_connector().await;

        let args = ActionArgs::from_value(json!({ "bucket": "docs" })).unwrap();
        let failure = read_object(&args, &config(), &connector).await.unwrap_err();
        assert_eq!(failure.message, READ_PARAMS_REQUIRED);

        let args = ActionArgs::from_value(json!({ "bucket": "docs", "key": "note.txt" })).unwrap();
        let failure = read_object(&args, &ProxyConfig::default(), &connector)
            .await
            .unwrap_err();
        assert_eq!(failure.message, READ_PARAMS_REQUIRED);
        assert_eq!(failure.bucket.as_deref(), Some("docs"));
        assert_eq!(failure.kind.status_code(), 400);
    }

    #[tokio::test]
    async fn test_should_report_missing_object() {
        let connector = seeded_connector().await;
        let args = ActionArgs::from_value(json!({ "bucket": "docs", "key": "absent" })).unwrap();

        let failure = read_object(&args, &config(), &connector).await.unwrap_err();
        assert_eq!(failure.message, "The specified key does not exist: absent");
        assert_eq!(failure.key.as_deref(), Some("absent"));
        assert_eq!(failure.kind.status_code(), 404);
    }

    #[tokio::test]
    async fn test_should_reject_non_json_body_target() {
        let connector = seeded_connector().await;
        let args = ActionArgs {
            body: Some(BASE64_STANDARD.encode(b"not json")),
            ..ActionArgs::default()
        };

        let failure = read_object(&args, &config(), &connector).await.unwrap_err();
        assert!(failure.message.starts_with("invalid action arguments"));
    }
}
