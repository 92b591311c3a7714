//! Multipart parsing errors.

/// Errors surfaced by boundary extraction and strict parsing.
///
/// The default lenient parser never returns these for body content; a body
/// without a boundary line simply yields no parts.
#[derive(Debug, thiserror::Error)]
pub enum MultipartError {
    /// The Content-Type is not `multipart/form-data` or `multipart/mixed`.
    #[error("expected multipart/form-data or multipart/mixed, got: {0}")]
    NotMultipart(String),

    /// The Content-Type has no usable `boundary=` parameter.
    #[error("missing or empty boundary in Content-Type")]
    MissingBoundary,

    /// The initial `--boundary` line never appeared in the body.
    #[error("multipart body does not contain the boundary line --{boundary}")]
    MalformedBody {
        /// The boundary that was searched for.
        boundary: String,
    },

    /// A part could not be turned into a [`Part`](crate::Part).
    #[error("multipart part #{index} could not be decoded: {source}")]
    PartDecoding {
        /// Zero-based position of the part in the body.
        index: usize,
        /// What went wrong for that part.
        #[source]
        source: PartDecodingError,
    },
}

/// Failure to reconstruct the fields of a single part.
#[derive(Debug, thiserror::Error)]
pub enum PartDecodingError {
    /// The disposition parameter has no `key=value` form.
    #[error("disposition parameter is not an assignment: {0:?}")]
    MissingAssignment(String),

    /// The disposition value is not a valid JSON-quoted string.
    #[error("disposition value {value} is not a quoted string")]
    InvalidQuotedValue {
        /// The raw value as it appeared in the header line.
        value: String,
        /// The JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The part info line carries no `Content-Type: value`.
    #[error("part info line carries no content type: {0:?}")]
    MissingContentType(String),
}
