//! Text/binary classification of content types.
//!
//! The read action returns text objects as UTF-8 and everything else as
//! base64. Whole families (`text/*`, `image/*`, ...) are decided by their top
//! level type; `application/*` and friends go through a lookup table.

/// Content type assumed when an object carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Media types whose classification cannot be derived from the top level type.
const MEDIA_TYPES: &[(&str, bool)] = &[
    ("application/atom+xml", false),
    ("application/base64", true),
    ("application/excel", true),
    ("application/font-woff", true),
    ("application/font-woff2", true),
    ("application/gnutar", true),
    ("application/java-archive", true),
    ("application/javascript", false),
    ("application/json", true),
    ("application/json-patch+json", true),
    ("application/lha", true),
    ("application/lzx", true),
    ("application/mspowerpoint", true),
    ("application/msword", true),
    ("application/octet-stream", true),
    ("application/pdf", true),
    ("application/postscript", true),
    ("application/rss+xml", false),
    ("application/soap+xml", false),
    ("application/vnd.api+json", true),
    ("application/vnd.google-earth.kml+xml", false),
    ("application/vnd.google-earth.kmz", true),
    ("application/vnd.ms-fontobject", true),
    ("application/vnd.oasis.opendocument.chart", true),
    ("application/vnd.oasis.opendocument.database", true),
    ("application/vnd.oasis.opendocument.formula", true),
    ("application/vnd.oasis.opendocument.graphics", true),
    ("application/vnd.oasis.opendocument.image", true),
    ("application/vnd.oasis.opendocument.presentation", true),
    ("application/vnd.oasis.opendocument.spreadsheet", true),
    ("application/vnd.oasis.opendocument.text", true),
    ("application/vnd.oasis.opendocument.text-master", true),
    ("application/vnd.oasis.opendocument.text-web", true),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.slide",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.template",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.template",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        true,
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template",
        true,
    ),
    ("application/x-7z-compressed", true),
    ("application/x-ace-compressed", true),
    ("application/x-apple-diskimage", true),
    ("application/x-arc-compressed", true),
    ("application/x-bzip", true),
    ("application/x-bzip2", true),
    ("application/x-chrome-extension", true),
    ("application/x-compress", true),
    ("application/x-compressed", true),
    ("application/x-debian-package", true),
    ("application/x-dvi", true),
    ("application/x-font-truetype", true),
    ("application/x-font-opentype", true),
    ("application/x-gtar", true),
    ("application/x-gzip", true),
    ("application/x-latex", true),
    ("application/x-rar-compressed", true),
    ("application/x-redhat-package-manager", true),
    ("application/x-shockwave-flash", true),
    ("application/x-tar", true),
    ("application/x-tex", true),
    ("application/x-texinfo", true),
    ("application/x-vrml", false),
    ("application/x-www-form-urlencoded", false),
    ("application/x-x509-ca-cert", true),
    ("application/x-xpinstall", true),
    ("application/xhtml+xml", false),
    ("application/xml-dtd", false),
    ("application/xml", false),
    ("application/zip", true),
];

/// Whether objects of `content_type` must be transported as base64.
///
/// Parameters (`; charset=...`) are ignored. Unknown types are treated as text.
#[must_use]
pub fn is_binary(content_type: &str) -> bool {
    let essence = content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .unwrap_or_else(|_| content_type.trim().to_ascii_lowercase());

    match essence.split('/').next().unwrap_or_default() {
        "text" | "message" => false,
        "audio" | "image" | "video" | "font" => true,
        _ => MEDIA_TYPES
            .iter()
            .find(|(name, _)| *name == essence)
            .is_some_and(|(_, binary)| *binary),
    }
}
