//! Multipart/form-data body parsing for cosproxy uploads.
//!
//! The write action receives uploads as a fully buffered `multipart/form-data`
//! body. This crate turns that body into an ordered list of [`Part`]s with a
//! single-pass byte-level state machine ([`parser`]), and extracts the
//! boundary token from the request's `Content-Type` header ([`boundary`]).
//!
//! Parsing is lenient by default: a body without the boundary yields no parts,
//! and a part whose headers cannot be decoded is skipped. Both behaviours can
//! be made strict through [`ParseOptions`].
//!
//! # Usage
//!
//! ```rust
//! use cosproxy_multipart::{extract_boundary, parse};
//!
//! let boundary = extract_boundary("multipart/form-data; boundary=b1").unwrap();
//! let body = b"--b1\r\n\
//!     Content-Disposition: form-data; name=\"meta\"\r\n\
//!     Content-Type: application/json\r\n\
//!     \r\n\
//!     {\"bucket\":\"docs\",\"key\":\"a.txt\"}\r\n\
//!     --b1--\r\n";
//!
//! let parts = parse(body, &boundary);
//! assert!(parts[0].is_metadata());
//! ```

pub mod boundary;
pub mod error;
pub mod parser;
mod part;

pub use boundary::extract_boundary;
pub use error::{MultipartError, PartDecodingError};
pub use parser::{BoundaryPolicy, MultipartParser, ParseOptions, PartErrorPolicy, parse};
pub use part::{DispositionField, Part};
