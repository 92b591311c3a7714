//! The parameter object an action is invoked with.
//!
//! Besides plain arguments (`bucket`, `key`, `endpoint`, credentials), the
//! runtime injects the bound service credentials (`__bx_creds`) and, for web
//! invocations, the raw HTTP request (`__ow_headers`, `__ow_body`, ...).

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// An HMAC access/secret key pair for SigV4 signing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacKeys {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl std::fmt::Debug for HmacKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"...")
            .finish()
    }
}

/// Credentials of a Cloud Object Storage service instance bound to the action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosServiceCredentials {
    /// HMAC keys generated for the service instance.
    pub cos_hmac_keys: Option<HmacKeys>,
    /// The service instance id.
    pub resource_instance_id: Option<String>,
}

/// Service credentials bound to the action, keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundCredentials {
    /// The `cloud-object-storage` binding.
    #[serde(rename = "cloud-object-storage")]
    pub cloud_object_storage: Option<CosServiceCredentials>,
}

/// Arguments of one action invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionArgs {
    /// Target bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Target object key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Object storage endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Signing region override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Explicit HMAC access key.
    #[serde(alias = "accessKeyId", skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Explicit HMAC secret key.
    #[serde(alias = "secretAccessKey", skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    /// Explicit service instance id.
    #[serde(alias = "serviceInstanceId", skip_serializing_if = "Option::is_none")]
    pub resource_instance_id: Option<String>,
    /// Service credentials bound by the runtime.
    #[serde(rename = "__bx_creds", skip_serializing_if = "Option::is_none")]
    pub bound_credentials: Option<BoundCredentials>,
    /// Request headers of a web invocation, lower-cased names.
    #[serde(rename = "__ow_headers", skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Base64-encoded request body of a web invocation.
    #[serde(rename = "__ow_body", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// HTTP method of a web invocation.
    #[serde(rename = "__ow_method", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request path of a web invocation.
    #[serde(rename = "__ow_path", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ActionArgs {
    /// Deserialize arguments from a JSON parameter object.
    ///
    /// # Errors
    /// Returns [`ActionError::InvalidArguments`] if the value is not a valid
    /// parameter object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(value).map_err(|e| ActionError::InvalidArguments(e.to_string()))
    }

    /// Look up a request header by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the base64 request body, if one was supplied.
    ///
    /// # Errors
    /// Returns [`ActionError::InvalidArguments`] if the body is not valid base64.
    pub fn decoded_body(&self) -> Result<Option<Vec<u8>>, ActionError> {
        self.body
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(|b| {
                BASE64_STANDARD
                    .decode(b.trim())
                    .map_err(|e| ActionError::InvalidArguments(format!("__ow_body is not base64: {e}")))
            })
            .transpose()
    }

    /// The bound Cloud Object Storage credentials, if any.
    #[must_use]
    pub fn cos_binding(&self) -> Option<&CosServiceCredentials> {
        self.bound_credentials
            .as_ref()
            .and_then(|b| b.cloud_object_storage.as_ref())
    }
}
