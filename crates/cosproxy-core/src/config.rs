//! Process-wide configuration for the cosproxy gateway and actions.
//!
//! Values are loaded from environment variables. Per-invocation action
//! arguments (endpoint, credentials, bucket, key) take precedence over what is
//! configured here; this struct only provides the fallbacks.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default Cloud Object Storage endpoint used when an invocation does not name one.
pub const DEFAULT_COS_ENDPOINT: &str = "s3.us.cloud-object-storage.appdomain.cloud";

/// Which object store implementation the gateway connects actions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// An S3-compatible remote service.
    #[default]
    S3,
    /// A process-local in-memory store.
    Memory,
}

impl StorageBackend {
    /// Parse a backend name, falling back to [`StorageBackend::S3`] for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::S3
        }
    }
}

/// cosproxy configuration.
///
/// # Examples
///
/// ```
/// use cosproxy_core::ProxyConfig;
///
/// let config = ProxyConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:8080");
/// assert!(!config.multipart_strict);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Bind address for the HTTP gateway.
    #[builder(default = String::from("0.0.0.0:8080"))]
    pub gateway_listen: String,

    /// Default object storage endpoint (host name or URL).
    #[builder(default = String::from(DEFAULT_COS_ENDPOINT))]
    pub cos_endpoint: String,

    /// Default signing region for the object storage client.
    #[builder(default = String::from("us-east-1"))]
    pub cos_region: String,

    /// HMAC access key used when an invocation carries no credentials.
    #[builder(default, setter(strip_option))]
    pub access_key_id: Option<String>,

    /// HMAC secret key paired with [`access_key_id`](Self::access_key_id).
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,

    /// Store implementation used by the gateway.
    #[builder(default)]
    pub storage_backend: StorageBackend,

    /// Report a body without an initial boundary as malformed instead of empty.
    #[builder(default = false)]
    pub multipart_strict: bool,

    /// Fail the whole parse when a single part cannot be decoded.
    #[builder(default = false)]
    pub multipart_abort_on_part_error: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:8080` |
    /// | `COS_ENDPOINT` | `s3.us.cloud-object-storage.appdomain.cloud` |
    /// | `COS_REGION` | `us-east-1` |
    /// | `COS_HMAC_ACCESS_KEY_ID` | *(unset)* |
    /// | `COS_HMAC_SECRET_ACCESS_KEY` | *(unset)* |
    /// | `STORAGE_BACKEND` | `s3` |
    /// | `MULTIPART_STRICT` | `false` |
    /// | `MULTIPART_ABORT_ON_PART_ERROR` | `false` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("COS_ENDPOINT") {
            config.cos_endpoint = v;
        }
        if let Some(v) = lookup("COS_REGION") {
            config.cos_region = v;
        }
        if let Some(v) = lookup("COS_HMAC_ACCESS_KEY_ID").filter(|v| !v.is_empty()) {
            config.access_key_id = Some(v);
        }
        if let Some(v) = lookup("COS_HMAC_SECRET_ACCESS_KEY").filter(|v| !v.is_empty()) {
            config.secret_access_key = Some(v);
        }
        if let Some(v) = lookup("STORAGE_BACKEND") {
            config.storage_backend = StorageBackend::parse(&v);
        }
        if let Some(v) = lookup("MULTIPART_STRICT") {
            config.multipart_strict = parse_bool(&v);
        }
        if let Some(v) = lookup("MULTIPART_ABORT_ON_PART_ERROR") {
            config.multipart_abort_on_part_error = parse_bool(&v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The configured HMAC key pair, if both halves are present.
    #[must_use]
    pub fn hmac_keys(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:8080");
        assert_eq!(config.cos_endpoint, DEFAULT_COS_ENDPOINT);
        assert_eq!(config.cos_region, "us-east-1");
        assert!(config.access_key_id.is_none());
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert!(!config.multipart_strict);
        assert!(!config.multipart_abort_on_part_error);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_load_from_env() {
        let config = ProxyConfig::from_env();
        assert!(!config.gateway_listen.is_empty());
    }

    #[test]
    fn test_should_load_from_lookup() {
        let config = ProxyConfig::from_lookup(lookup_from(&[
            ("GATEWAY_LISTEN", "127.0.0.1:9000"),
            ("COS_ENDPOINT", "http://localhost:4566"),
            ("COS_HMAC_ACCESS_KEY_ID", "AK"),
            ("COS_HMAC_SECRET_ACCESS_KEY", "SK"),
            ("STORAGE_BACKEND", "Memory"),
            ("MULTIPART_STRICT", "1"),
            ("MULTIPART_ABORT_ON_PART_ERROR", "TRUE"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.gateway_listen, "127.0.0.1:9000");
        assert_eq!(config.cos_endpoint, "http://localhost:4566");
        assert_eq!(config.hmac_keys(), Some(("AK", "SK")));
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.multipart_strict);
        assert!(config.multipart_abort_on_part_error);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_should_ignore_empty_credentials() {
        let config = ProxyConfig::from_lookup(lookup_from(&[
            ("COS_HMAC_ACCESS_KEY_ID", ""),
            ("COS_HMAC_SECRET_ACCESS_KEY", "SK"),
        ]));
        assert!(config.access_key_id.is_none());
        assert!(config.hmac_keys().is_none());
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = ProxyConfig::builder()
            .gateway_listen("127.0.0.1:1234".into())
            .access_key_id("AK".into())
            .secret_access_key("SK".into())
            .storage_backend(StorageBackend::Memory)
            .multipart_strict(true)
            .build();

        assert_eq!(config.gateway_listen, "127.0.0.1:1234");
        assert_eq!(config.hmac_keys(), Some(("AK", "SK")));
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.multipart_strict);
    }

    #[test]
    fn test_should_serialize_to_camel_case_json_without_secret() {
        let config = ProxyConfig::builder()
            .secret_access_key("hidden".into())
            .build();
        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("gatewayListen"));
        assert!(json.contains("storageBackend"));
        assert!(!json.contains("hidden"));
    }
}
