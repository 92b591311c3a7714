//! Common type definitions shared across the actions and the gateway.

use std::fmt;

use crate::error::{ProxyError, ProxyResult};

/// A bucket/key pair addressing one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ObjectLocation {
    /// Bucket name.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ObjectLocation {
    /// Create a location, rejecting empty bucket names or keys.
    ///
    /// # Errors
    /// Returns [`ProxyError::InvalidLocation`] if either component is empty.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> ProxyResult<Self> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() {
            return Err(ProxyError::InvalidLocation("empty bucket name".to_owned()));
        }
        if key.is_empty() {
            return Err(ProxyError::InvalidLocation(format!(
                "empty object key in bucket {bucket}"
            )));
        }
        Ok(Self { bucket, key })
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// An object storage endpoint URL.
///
/// Endpoints are commonly configured as bare host names; those are served
/// over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Endpoint(String);

impl Endpoint {
    /// Parse an endpoint, prefixing `https://` when no scheme is given.
    ///
    /// # Errors
    /// Returns [`ProxyError::Config`] for an empty endpoint.
    pub fn parse(value: &str) -> ProxyResult<Self> {
        let value = value.trim().trim_end_matches('/');
        if value.is_empty() {
            return Err(ProxyError::Config("empty object storage endpoint".to_owned()));
        }
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(Self(value.to_owned()))
        } else {
            Ok(Self(format!("https://{value}")))
        }
    }

    /// Get the endpoint URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_location() {
        let loc = ObjectLocation::new("photos", "2024/cat.png").unwrap();
        assert_eq!(loc.bucket, "photos");
        assert_eq!(loc.key, "2024/cat.png");
        assert_eq!(loc.to_string(), "photos/2024/cat.png");
    }

    #[test]
    fn test_should_reject_empty_location_parts() {
        assert!(ObjectLocation::new("", "key").is_err());
        assert!(ObjectLocation::new("bucket", "").is_err());
    }

    #[test]
    fn test_should_prefix_https_for_bare_host() {
        let ep = Endpoint::parse("s3.us.cloud-object-storage.appdomain.cloud").unwrap();
        assert_eq!(ep.as_str(), "https://s3.us.cloud-object-storage.appdomain.cloud");
    }

    #[test]
    fn test_should_keep_explicit_scheme() {
        let ep = Endpoint::parse("http://localhost:4566/").unwrap();
        assert_eq!(ep.as_str(), "http://localhost:4566");
    }

    #[test]
    fn test_should_reject_empty_endpoint() {
        assert!(matches!(Endpoint::parse("  "), Err(ProxyError::Config(_))));
    }
}
