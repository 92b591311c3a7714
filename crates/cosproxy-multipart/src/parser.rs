//! Single-pass finite-state machine over a buffered multipart body.
//!
//! The machine looks at one byte at a time together with the byte before it.
//! Only the exact pair CR LF ends a line; CR and LF bytes never become part of
//! the accumulated line text.
//!
//! ```text
//! SeekingBoundary --"--boundary" CRLF--> PartHeader --CRLF--> PartInfo
//!        ^                                   ^                   |
//!        |                                   |                 CRLF
//!    (no match)                            CRLF                  v
//!                                     BetweenParts <--"--boundary"-- Body <--CRLF-- BlankLine
//! ```

use tracing::{debug, warn};
use typed_builder::TypedBuilder;

use crate::error::{MultipartError, PartDecodingError};
use crate::part::{Part, decode_part};

const CR: u8 = 0x0d;
const LF: u8 = 0x0a;

/// Initial capacity of the per-part body buffer.
const BODY_CAPACITY_HINT: usize = 8 * 1024;

/// Slack allowed past the delimiter length before the candidate line is dropped.
const CANDIDATE_SLACK: usize = 2;

/// What to do when the body never contains the initial boundary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Return no parts.
    #[default]
    Lenient,
    /// Return [`MultipartError::MalformedBody`].
    Strict,
}

/// What to do with a part whose header fields cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartErrorPolicy {
    /// Log a warning and drop the part.
    #[default]
    Skip,
    /// Fail the whole parse with [`MultipartError::PartDecoding`].
    Abort,
}

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct ParseOptions {
    /// Handling of bodies without the initial boundary.
    #[builder(default)]
    pub boundary_policy: BoundaryPolicy,
    /// Handling of undecodable parts.
    #[builder(default)]
    pub part_errors: PartErrorPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingBoundary,
    PartHeader,
    PartInfo,
    BlankLine,
    Body,
    BetweenParts,
}

/// Scratch buffers for one parse call.
#[derive(Debug)]
struct Scratch {
    state: State,
    line: Vec<u8>,
    header: Vec<u8>,
    info: Vec<u8>,
    body: Vec<u8>,
    /// The current body line grew past any possible delimiter.
    overflowed: bool,
}

impl Scratch {
    fn new(delimiter_len: usize, input_len: usize) -> Self {
        Self {
            state: State::SeekingBoundary,
            line: Vec::with_capacity(delimiter_len + CANDIDATE_SLACK + 1),
            header: Vec::new(),
            info: Vec::new(),
            body: Vec::with_capacity(input_len.min(BODY_CAPACITY_HINT)),
            overflowed: false,
        }
    }

    fn finish_part(&mut self) {
        self.body.clear();
        self.line.clear();
        self.header.clear();
        self.info.clear();
        self.overflowed = false;
        self.state = State::BetweenParts;
    }
}

/// A reusable multipart parser bound to one boundary.
///
/// # Examples
///
/// ```
/// use cosproxy_multipart::MultipartParser;
///
/// let body = b"--XyZ\r\n\
///     Content-Disposition: form-data; name=\"uploads[]\"; filename=\"A.txt\"\r\n\
///     Content-Type: text/plain\r\n\
///     \r\n\
///     AAAABBBB\r\n\
///     --XyZ--\r\n";
///
/// let parts = MultipartParser::new("XyZ").unwrap().parse(body).unwrap();
/// assert_eq!(parts.len(), 1);
/// assert_eq!(parts[0].filename(), Some("A.txt"));
/// assert_eq!(parts[0].data().as_ref(), b"AAAABBBB");
/// ```
#[derive(Debug, Clone)]
pub struct MultipartParser {
    boundary: String,
    delimiter: Vec<u8>,
    options: ParseOptions,
}

impl MultipartParser {
    /// Create a parser for `boundary` with default (lenient) options.
    ///
    /// # Errors
    /// Returns [`MultipartError::MissingBoundary`] for an empty boundary.
    pub fn new(boundary: &str) -> Result<Self, MultipartError> {
        if boundary.is_empty() {
            return Err(MultipartError::MissingBoundary);
        }
        Ok(Self {
            boundary: boundary.to_owned(),
            delimiter: format!("--{boundary}").into_bytes(),
            options: ParseOptions::default(),
        })
    }

    /// Replace the parse options.
    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// The boundary this parser matches.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Extract all parts from `body`, in order of appearance.
    ///
    /// # Errors
    /// Only returns errors under [`BoundaryPolicy::Strict`] or
    /// [`PartErrorPolicy::Abort`].
    pub fn parse(&self, body: &[u8]) -> Result<Vec<Part>, MultipartError> {
        let delimiter = self.delimiter.as_slice();
        let candidate_limit = delimiter.len() + CANDIDATE_SLACK;
        let mut scratch = Scratch::new(delimiter.len(), body.len());
        let mut parts = Vec::new();
        let mut seen = 0usize;
        let mut found_boundary = false;
        let mut prev: Option<u8> = None;

        for &byte in body {
            let terminator = byte == LF && prev == Some(CR);
            prev = Some(byte);

            if byte != CR && byte != LF {
                scratch.line.push(byte);
            }

            match scratch.state {
                State::SeekingBoundary => {
                    if terminator {
                        if scratch.line == delimiter {
                            found_boundary = true;
                            scratch.state = State::PartHeader;
                        }
                        scratch.line.clear();
                    }
                }
                State::PartHeader => {
                    if terminator {
                        std::mem::swap(&mut scratch.header, &mut scratch.line);
                        scratch.line.clear();
                        scratch.state = State::PartInfo;
                    }
                }
                State::PartInfo => {
                    if terminator {
                        std::mem::swap(&mut scratch.info, &mut scratch.line);
                        scratch.line.clear();
                        scratch.state = State::BlankLine;
                    }
                }
                State::BlankLine => {
                    if terminator {
                        scratch.body.clear();
                        scratch.line.clear();
                        scratch.overflowed = false;
                        scratch.state = State::Body;
                    }
                }
                State::Body => {
                    scratch.body.push(byte);
                    // An overlong line stays unmatchable until the next CRLF.
                    if scratch.line.len() > candidate_limit {
                        scratch.line.clear();
                        scratch.overflowed = true;
                    }
                    if !scratch.overflowed && scratch.line == delimiter {
                        // Drop the delimiter text and the CRLF in front of it.
                        let keep = scratch
                            .body
                            .len()
                            .saturating_sub(scratch.line.len() + 2);
                        let decoded = decode_part(
                            &String::from_utf8_lossy(&scratch.header),
                            &String::from_utf8_lossy(&scratch.info),
                            &scratch.body[..keep],
                        );
                        self.collect(decoded, seen, &mut parts)?;
                        seen += 1;
                        scratch.finish_part();
                    } else if terminator {
                        scratch.line.clear();
                        scratch.overflowed = false;
                    }
                }
                State::BetweenParts => {
                    if terminator {
                        scratch.line.clear();
                        scratch.state = State::PartHeader;
                    }
                }
            }
        }

        if !found_boundary && self.options.boundary_policy == BoundaryPolicy::Strict {
            return Err(MultipartError::MalformedBody {
                boundary: self.boundary.clone(),
            });
        }

        debug!(
            boundary = %self.boundary,
            body_len = body.len(),
            parts = parts.len(),
            skipped = seen - parts.len(),
            "parsed multipart body"
        );

        Ok(parts)
    }

    fn collect(
        &self,
        decoded: Result<Part, PartDecodingError>,
        index: usize,
        parts: &mut Vec<Part>,
    ) -> Result<(), MultipartError> {
        match decoded {
            Ok(part) => {
                parts.push(part);
                Ok(())
            }
            Err(source) => match self.options.part_errors {
                PartErrorPolicy::Skip => {
                    warn!(index, error = %source, "skipping undecodable multipart part");
                    Ok(())
                }
                PartErrorPolicy::Abort => Err(MultipartError::PartDecoding { index, source }),
            },
        }
    }
}

/// Parse `body` leniently: malformed input yields fewer (or no) parts, never an error.
///
/// An empty boundary yields no parts.
#[must_use]
pub fn parse(body: &[u8], boundary: &str) -> Vec<Part> {
    MultipartParser::new(boundary)
        .and_then(|parser| parser.parse(body))
        .unwrap_or_default()
}
