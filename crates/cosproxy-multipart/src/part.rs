//! Extracted multipart parts and the reconstruction of their header fields.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PartDecodingError;

/// The `name` or `filename` parameter of a part's `Content-Disposition` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispositionField {
    /// A form field name, e.g. `uploads[]`.
    Name(String),
    /// The client-side file name of an uploaded file.
    Filename(String),
}

impl DispositionField {
    /// The decoded value regardless of which parameter carried it.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Name(v) | Self::Filename(v) => v,
        }
    }
}

/// One part of a multipart body.
///
/// The payload is an owned copy; it stays valid after the parser moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    disposition: Option<DispositionField>,
    content_type: String,
    data: Bytes,
}

impl Part {
    /// Create a part from already decoded fields.
    #[must_use]
    pub fn new(
        disposition: Option<DispositionField>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            disposition,
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// The disposition parameter, if the header line carried one.
    #[must_use]
    pub fn disposition(&self) -> Option<&DispositionField> {
        self.disposition.as_ref()
    }

    /// The form field name, when the disposition parameter was `name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.disposition {
            Some(DispositionField::Name(v)) => Some(v),
            _ => None,
        }
    }

    /// The file name, when the disposition parameter was `filename`.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match &self.disposition {
            Some(DispositionField::Filename(v)) => Some(v),
            _ => None,
        }
    }

    /// The content type declared by the part.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The raw payload bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the part and return its payload.
    #[must_use]
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Whether this part carries JSON metadata rather than an upload payload.
    ///
    /// Parameters such as `charset` are ignored and the media type is compared
    /// case-insensitively.
    #[must_use]
    pub fn is_metadata(&self) -> bool {
        self.content_type
            .parse::<mime::Mime>()
            .is_ok_and(|m| m.essence_str().eq_ignore_ascii_case("application/json"))
    }

    /// Deserialize the payload as UTF-8 JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the payload is not valid JSON for `T`.
    pub fn metadata<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.data)
    }
}

/// Build a [`Part`] from the stored header line, info line, and body bytes.
///
/// Only the third `;`-separated segment of the header line is consulted, which
/// for `form-data; name="uploads[]"; filename="A.txt"` is the file name.
pub(crate) fn decode_part(header: &str, info: &str, body: &[u8]) -> Result<Part, PartDecodingError> {
    let disposition = match header.split(';').nth(2) {
        Some(segment) if !segment.trim().is_empty() => decode_disposition(segment)?,
        _ => None,
    };
    let content_type = decode_content_type(info)?;

    Ok(Part {
        disposition,
        content_type,
        data: Bytes::copy_from_slice(body),
    })
}

/// Decode `key="value"`. Keys other than `name` and `filename` carry no
/// disposition but do not invalidate the part.
fn decode_disposition(segment: &str) -> Result<Option<DispositionField>, PartDecodingError> {
    let (key, raw) = segment
        .split_once('=')
        .ok_or_else(|| PartDecodingError::MissingAssignment(segment.trim().to_owned()))?;
    let raw = raw.trim();
    let value: String =
        serde_json::from_str(raw).map_err(|source| PartDecodingError::InvalidQuotedValue {
            value: raw.to_owned(),
            source,
        })?;

    match key.trim() {
        "name" => Ok(Some(DispositionField::Name(value))),
        "filename" => Ok(Some(DispositionField::Filename(value))),
        other => {
            debug!(parameter = other, "ignoring unsupported disposition parameter");
            Ok(None)
        }
    }
}

fn decode_content_type(info: &str) -> Result<String, PartDecodingError> {
    info.split(':')
        .nth(1)
        .map(|v| v.trim().to_owned())
        .ok_or_else(|| PartDecodingError::MissingContentType(info.to_owned()))
}
