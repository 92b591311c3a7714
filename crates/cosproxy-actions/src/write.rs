//! The write action: store an object uploaded as `multipart/form-data`.
//!
//! The upload carries one JSON metadata part naming the destination
//! (`{"bucket": .., "key": ..}`) and one payload part with the object
//! content, in any order.

use std::collections::BTreeMap;

use bytes::Bytes;
use cosproxy_core::{ObjectLocation, ProxyConfig};
use cosproxy_multipart::{
    BoundaryPolicy, MultipartParser, ParseOptions, PartErrorPolicy, extract_boundary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::args::ActionArgs;
use crate::connection::ConnectionParams;
use crate::error::{ActionError, ActionFailure, WRITE_PARAMS_REQUIRED};
use crate::store::{PutReceipt, StoreConnector};

/// Body of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    /// Bucket written to.
    pub bucket: String,
    /// Key written.
    pub key: String,
    /// The store's acknowledgement.
    pub body: PutReceipt,
}

/// Successful result of the write action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutput {
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: WriteResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UploadTarget {
    bucket: Option<String>,
    key: Option<String>,
}

/// What an upload body resolved to.
#[derive(Debug, Default)]
struct UploadForm {
    bucket: Option<String>,
    key: Option<String>,
    payload: Option<Bytes>,
    content_type: Option<String>,
}

/// Parser options derived from the process configuration.
#[must_use]
pub fn parse_options(config: &ProxyConfig) -> ParseOptions {
    ParseOptions::builder()
        .boundary_policy(if config.multipart_strict {
            BoundaryPolicy::Strict
        } else {
            BoundaryPolicy::Lenient
        })
        .part_errors(if config.multipart_abort_on_part_error {
            PartErrorPolicy::Abort
        } else {
            PartErrorPolicy::Skip
        })
        .build()
}

/// Decode the multipart upload carried by a web invocation.
///
/// A request that is not multipart, or has no body, resolves to an empty form.
fn collect_upload(args: &ActionArgs, options: ParseOptions) -> Result<UploadForm, ActionError> {
    let Some(content_type) = args.header("content-type") else {
        return Ok(UploadForm::default());
    };
    let boundary = match extract_boundary(content_type) {
        Ok(boundary) => boundary,
        Err(e) => {
            debug!(content_type, error = %e, "upload is not a multipart body");
            return Ok(UploadForm::default());
        }
    };
    let Some(raw) = args.decoded_body()? else {
        return Ok(UploadForm::default());
    };

    let parts = MultipartParser::new(&boundary)?
        .with_options(options)
        .parse(&raw)?;

    let mut form = UploadForm::default();
    for part in parts {
        if part.is_metadata() {
            let target: UploadTarget = part.metadata().map_err(|e| {
                ActionError::InvalidArguments(format!("metadata part is not valid JSON: {e}"))
            })?;
            match (target.bucket, target.key) {
                (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                    form.bucket = Some(bucket);
                    form.key = Some(key);
                }
                _ => debug!("ignoring metadata part without bucket and key"),
            }
        } else {
            form.content_type = Some(part.content_type().to_owned());
            form.payload = Some(part.into_data());
        }
    }

    Ok(form)
}

/// Write an uploaded object to storage.
///
/// # Errors
/// Returns the failure result object when the destination, payload, or
/// credentials are missing, when the body cannot be decoded, or when the
/// store rejects the write.
pub async fn write_object(
    args: &ActionArgs,
    config: &ProxyConfig,
    connector: &dyn StoreConnector,
) -> Result<WriteOutput, ActionFailure> {
    let form = collect_upload(args, parse_options(config)).map_err(|e| {
        warn!(error = %e, "failed to decode upload");
        ActionFailure::new(&e, None, None)
    })?;
    let fail = |e: ActionError| ActionFailure::new(&e, form.bucket.clone(), form.key.clone());

    let connection = ConnectionParams::resolve(args, config).map_err(fail)?;
    let (Some(bucket), Some(key), Some(payload), Some(connection)) =
        (&form.bucket, &form.key, &form.payload, connection)
    else {
        return Err(fail(ActionError::MissingParameters(WRITE_PARAMS_REQUIRED)));
    };
    let location =
        ObjectLocation::new(bucket.as_str(), key.as_str()).map_err(|e| fail(e.into()))?;

    debug!(
        %location,
        bytes = payload.len(),
        content_type = ?form.content_type,
        "writing object"
    );
    let store = connector.connect(&connection);
    let receipt = store
        .put_object(&location, payload.clone(), form.content_type.as_deref())
        .await
        .map_err(|e| {
            warn!(%location, error = %e, "object write failed");
            fail(e.into())
        })?;

    Ok(WriteOutput {
        headers: BTreeMap::from([("content-type".to_owned(), "application/json".to_owned())]),
        body: WriteResult {
            bucket: location.bucket,
            key: location.key,
            body: receipt,
        },
    })
}
