//! # wireline
//!
//! Turns an arbitrarily chunked byte stream into two things:
//!
//! * newline-delimited **lines**, reassembled exactly no matter how reads
//!   split the input ([`LineAssembler`], [`Lines`], [`line_channel`]);
//! * a strictly validated HTTP/1.x **request line** (method, target,
//!   version), scanned either from a complete buffer
//!   ([`parse_request_line`]) or incrementally as chunks arrive
//!   ([`RequestLineParser`], [`read_request_line`]).
//!
//! Failures are classified by [`ErrorKind`]; [`RequestError::code`] maps a
//! failure to the HTTP status a server should answer with.
//!
//! ## Quick start: buffered request line
//!
//! ```rust
//! use wireline::parse_request_line;
//!
//! let raw = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
//! let line = parse_request_line(raw).expect("valid request line");
//! assert_eq!(line.method, "GET");
//! assert_eq!(line.target, "/coffee");
//! assert_eq!(line.version, "1.1");
//! ```
//!
//! ## Quick start: lines
//!
//! ```rust
//! use wireline::{Lines, LinesConfig};
//!
//! let config = LinesConfig { chunk_size: 3, ..LinesConfig::default() };
//! let lines: Vec<_> = Lines::with_config(&b"foo\nbar\nba"[..], &config)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(lines, ["foo", "bar", "ba"]);
//! ```

mod charset;
mod error;
mod lines;
mod output;
mod parser;
mod scan;
mod server;
mod stream;
mod types;

// Re-export public API.
pub use error::{ErrorKind, RequestError, SetupError, UnexpectedByte};
pub use lines::{LineAssembler, Lines, LinesConfig};
pub use output::{format_debug, format_error, format_json, format_wire};
pub use parser::{RequestLineParser, ScanConfig, ScanStatus};
pub use scan::{
    parse_request_line, parse_request_line_with_config, request_from_reader,
    request_from_reader_with_config, MIN_REQUEST_LINE_LEN,
};
pub use server::{
    bind_listener, connect_udp, send_lines, serve_lines, serve_request_lines, ServerConfig,
    DEFAULT_ADDR,
};
pub use stream::{line_channel, read_request_line};
pub use types::RequestLine;

/// Parse a request line held in a complete buffer with the incremental
/// parser, as if the whole buffer had arrived in one read.
///
/// Unlike [`parse_request_line`] there is no minimum length; truncated
/// input is classified by where it stops.
///
/// # Errors
///
/// Returns [`RequestError`] classifying the first violation found.
pub fn parse_request_line_incremental(
    data: &[u8],
    config: ScanConfig,
) -> Result<RequestLine, RequestError> {
    let mut parser = RequestLineParser::with_config(config);
    parser.feed(data)?;
    parser.finish()
}
