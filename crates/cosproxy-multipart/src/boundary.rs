//! Boundary extraction from a `Content-Type` header value.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::MultipartError;

static BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)multipart/(?:mixed|form-data);\s*boundary=(.*)")
        .expect("boundary pattern should compile")
});

/// Extract the boundary from `multipart/form-data; boundary=...` or
/// `multipart/mixed; boundary=...`.
///
/// A quoted boundary is unquoted; an unquoted one ends at the next `;`.
///
/// # Errors
///
/// Returns [`MultipartError::NotMultipart`] for other media types and
/// [`MultipartError::MissingBoundary`] when the parameter is absent or empty.
pub fn extract_boundary(content_type: &str) -> Result<String, MultipartError> {
    let Some(captures) = BOUNDARY_RE.captures(content_type) else {
        return if content_type.to_ascii_lowercase().contains("multipart/") {
            Err(MultipartError::MissingBoundary)
        } else {
            Err(MultipartError::NotMultipart(content_type.to_owned()))
        };
    };

    let raw = captures.get(1).map_or("", |m| m.as_str()).trim();
    let boundary = match raw.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or_default(),
        None => raw.split(';').next().unwrap_or_default().trim(),
    };

    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }
    Ok(boundary.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_extract_form_data_boundary() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxkTrZu0gW";
        let b = extract_boundary(ct).expect("should extract boundary");
        assert_eq!(b, "----WebKitFormBoundary7MA4YWxkTrZu0gW");
    }

    #[test]
    fn test_should_extract_mixed_boundary_without_space() {
        let b = extract_boundary("multipart/mixed;boundary=abc").expect("should extract");
        assert_eq!(b, "abc");
    }

    #[test]
    fn test_should_extract_quoted_boundary() {
        let ct = r#"multipart/form-data; boundary="abc 123""#;
        let b = extract_boundary(ct).expect("should extract boundary");
        assert_eq!(b, "abc 123");
    }

    #[test]
    fn test_should_stop_unquoted_boundary_at_next_parameter() {
        let b = extract_boundary("Multipart/Form-Data; boundary=xyz; charset=utf-8")
            .expect("should extract");
        assert_eq!(b, "xyz");
    }

    #[test]
    fn test_should_reject_non_multipart() {
        let err = extract_boundary("application/json").unwrap_err();
        assert!(matches!(err, MultipartError::NotMultipart(_)));
    }

    #[test]
    fn test_should_reject_missing_boundary() {
        let err = extract_boundary("multipart/form-data").unwrap_err();
        assert!(matches!(err, MultipartError::MissingBoundary));

        let err = extract_boundary("multipart/form-data; boundary=").unwrap_err();
        assert!(matches!(err, MultipartError::MissingBoundary));
    }
}
