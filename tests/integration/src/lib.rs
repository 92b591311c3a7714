//! Integration tests for the cosproxy gateway.
//!
//! These tests require a running `cosproxy-server` at `localhost:8080`
//! started with `STORAGE_BACKEND=memory` and fallback HMAC keys set, e.g.
//!
//! ```text
//! STORAGE_BACKEND=memory COS_HMAC_ACCESS_KEY_ID=test COS_HMAC_SECRET_ACCESS_KEY=test \
//!     cosproxy-server
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p cosproxy-integration -- --ignored
//! ```

use std::sync::Once;

use bytes::Bytes;

static INIT: Once = Once::new();

/// Boundary used by [`multipart_upload`].
pub const BOUNDARY: &str = "----cosproxyIntegrationBoundary";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Base URL of the gateway.
#[must_use]
pub fn gateway_url() -> String {
    std::env::var("COSPROXY_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Create an HTTP client for the gateway.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Generate a unique object key for a test.
#[must_use]
pub fn test_key(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// `Content-Type` header value for bodies built by [`multipart_upload`].
#[must_use]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Build an upload body: a JSON metadata part naming the destination
/// followed by the file part.
#[must_use]
pub fn multipart_upload(bucket: &str, key: &str, content_type: &str, data: &[u8]) -> Bytes {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"metadata\"; name=\"metadata\"\r\n\
         Content-Type: application/json\r\n\r\n{{\"bucket\":\"{bucket}\",\"key\":\"{key}\"}}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{key}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

/// Upload `data` through `/write`, returning the response.
pub async fn upload(
    client: &reqwest::Client,
    bucket: &str,
    key: &str,
    content_type: &str,
    data: &[u8],
) -> reqwest::Response {
    client
        .post(format!("{}/write", gateway_url()))
        .header("content-type", multipart_content_type())
        .body(multipart_upload(bucket, key, content_type, data))
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to upload {bucket}/{key}: {e}"))
}

mod test_errors;
mod test_health;
mod test_object;
