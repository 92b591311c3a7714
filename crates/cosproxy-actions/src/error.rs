//! Action errors and the result object reported when an action fails.
//!
//! Actions report failure the way a serverless runtime expects: as a JSON
//! object echoing the requested bucket and key together with a `message`.
//! [`ActionError`] is the typed error; [`ActionFailure`] is what gets
//! serialized.

use cosproxy_core::ProxyError;
use cosproxy_multipart::MultipartError;
use serde::Serialize;

use crate::store::StoreError;

/// Message reported by the read action when parameters are incomplete.
pub const READ_PARAMS_REQUIRED: &str =
    "bucket name, key, and apikey are required for this operation.";

/// Message reported by the write action when parameters are incomplete.
pub const WRITE_PARAMS_REQUIRED: &str =
    "bucket name, key, body, and apikey are required for this operation.";

/// Errors raised while running an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Bucket, key, body, or credentials could not be determined.
    #[error("{0}")]
    MissingParameters(&'static str),

    /// The invocation arguments could not be decoded.
    #[error("invalid action arguments: {0}")]
    InvalidArguments(String),

    /// The upload body could not be parsed.
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// The object store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Endpoint or location validation failed.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// Broad classification of a failure, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureKind {
    /// Required parameters were missing.
    MissingParameters,
    /// The request itself was malformed.
    #[default]
    InvalidRequest,
    /// The bucket or object does not exist.
    NotFound,
    /// The storage backend failed.
    Backend,
}

impl FailureKind {
    /// The HTTP status code conventionally used for this kind of failure.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::MissingParameters | Self::InvalidRequest => 400,
            Self::NotFound => 404,
            Self::Backend => 502,
        }
    }
}

/// The result object an action returns on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    /// The bucket the action was working on, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// The object key the action was working on, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Human-readable failure description.
    pub message: String,
    /// Failure classification; not part of the serialized object.
    #[serde(skip)]
    pub kind: FailureKind,
}

impl ActionFailure {
    /// Build the failure object for `error`, echoing the target when known.
    #[must_use]
    pub fn new(error: &ActionError, bucket: Option<String>, key: Option<String>) -> Self {
        Self {
            bucket,
            key,
            message: error.to_string(),
            kind: error.kind(),
        }
    }
}

impl ActionError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingParameters(_) => FailureKind::MissingParameters,
            Self::InvalidArguments(_) | Self::Multipart(_) | Self::Proxy(_) => {
                FailureKind::InvalidRequest
            }
            Self::Store(StoreError::NoSuchBucket { .. } | StoreError::NoSuchKey { .. }) => {
                FailureKind::NotFound
            }
            Self::Store(StoreError::Backend(_)) => FailureKind::Backend,
        }
    }
}
