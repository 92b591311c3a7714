//! Gateway response body.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;

/// Response body of the gateway.
///
/// Actions hand back fully buffered object content or JSON, so the body is
/// a single frame. An empty body ends the stream immediately.
#[derive(Debug, Default)]
pub struct ProxyResponseBody(Full<Bytes>);

impl ProxyResponseBody {
    /// Wrap buffered content: object bytes, a JSON result, or a failure object.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(Full::new(data.into()))
    }

    /// A body without content, for preflight and serialization failures.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl http_body::Body for ProxyResponseBody {
    type Data = Bytes;
    type Error = std::convert::Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.get_mut().0).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        self.0.size_hint()
    }
}
