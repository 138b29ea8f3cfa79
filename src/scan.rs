//! Single-pass scanner for a fully buffered request line.

use std::io::Read;

use crate::charset::{is_tchar, is_vchar};
use crate::error::{ErrorKind, RequestError};
use crate::parser::{
    expect_digit, reject_method_byte, reject_target_byte, ScanConfig, VERSION_LITERAL,
};
use crate::types::RequestLine;

/// Shortest input that can hold a request line: `A / HTTP/1.1`.
pub const MIN_REQUEST_LINE_LEN: usize = 12;

/// Headroom left after the method when its scan is bounded by the buffer.
const METHOD_TAIL_LEN: usize = 8;

/// Parse the request line at the head of a complete buffer.
///
/// Anything after the line terminator (headers, body) is ignored.
///
/// # Errors
///
/// Returns [`RequestError`] classifying the first violation found.
pub fn parse_request_line(data: &[u8]) -> Result<RequestLine, RequestError> {
    parse_request_line_with_config(data, &ScanConfig::default())
}

/// Parse the request line at the head of `data` using custom limits.
///
/// # Errors
///
/// Returns [`RequestError`] classifying the first violation found.
pub fn parse_request_line_with_config(
    data: &[u8],
    config: &ScanConfig,
) -> Result<RequestLine, RequestError> {
    if data.is_empty() {
        return Err(ErrorKind::EmptyInput.into());
    }
    if data.len() < MIN_REQUEST_LINE_LEN {
        return Err(ErrorKind::TooShort.into());
    }

    let method_end = scan_method(data, config)?;
    let target_start = method_end + 1;
    let target_end = scan_target(data, target_start, config)?;
    let version_start = target_end + 1 + VERSION_LITERAL.len();
    scan_literal(data, target_end + 1)?;
    let version_end = scan_version(data, version_start)?;
    scan_terminator(data, version_end)?;

    Ok(RequestLine::from_parts(
        &data[..method_end],
        &data[target_start..target_end],
        &data[version_start..version_end],
    ))
}

/// Read `reader` to completion, then parse the request line at its head.
///
/// # Errors
///
/// A read failure is reported as [`ErrorKind::UpstreamReadFailure`] with the
/// I/O error as its source; everything else as in [`parse_request_line`].
pub fn request_from_reader<R: Read>(reader: R) -> Result<RequestLine, RequestError> {
    request_from_reader_with_config(reader, &ScanConfig::default())
}

/// [`request_from_reader`] with custom limits.
///
/// # Errors
///
/// See [`request_from_reader`].
pub fn request_from_reader_with_config<R: Read>(
    mut reader: R,
    config: &ScanConfig,
) -> Result<RequestLine, RequestError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(RequestError::upstream)?;
    parse_request_line_with_config(&buf, config)
}

// Returns the offset of the SP that ends the method.
fn scan_method(data: &[u8], config: &ScanConfig) -> Result<usize, RequestError> {
    let cap = config
        .max_method_len
        .min(data.len() - METHOD_TAIL_LEN)
        .max(1);

    for (i, &byte) in data.iter().enumerate().take(cap + 1) {
        if byte == b' ' {
            if i == 0 {
                return Err(ErrorKind::MissingMethod.into());
            }
            return Ok(i);
        }
        if !is_tchar(byte) {
            return Err(reject_method_byte(byte, i));
        }
    }
    Err(ErrorKind::MethodTooLong.into())
}

// Returns the offset of the SP that ends the target.
fn scan_target(data: &[u8], start: usize, config: &ScanConfig) -> Result<usize, RequestError> {
    for (len, &byte) in data[start..].iter().enumerate() {
        if byte == b' ' {
            if len == 0 {
                return Err(ErrorKind::MissingTarget.into());
            }
            return Ok(start + len);
        }
        if !is_vchar(byte) {
            return Err(reject_target_byte(byte, start + len));
        }
        if len >= config.max_target_len {
            return Err(ErrorKind::TargetTooLong.into());
        }
    }
    Err(ErrorKind::MissingSeparator.into())
}

fn scan_literal(data: &[u8], start: usize) -> Result<(), RequestError> {
    let rest = &data[start..];
    if let Some((i, &byte)) = rest
        .iter()
        .zip(VERSION_LITERAL)
        .enumerate()
        .find_map(|(i, (got, want))| (got != want).then_some((i, got)))
    {
        return Err(RequestError::unexpected(
            ErrorKind::InvalidProtocolLiteral,
            "\"HTTP/\"",
            byte,
            start + i,
        ));
    }
    if rest.len() < VERSION_LITERAL.len() {
        return Err(ErrorKind::InvalidProtocolLiteral.into());
    }
    Ok(())
}

// Returns the offset just past the minor digit.
fn scan_version(data: &[u8], start: usize) -> Result<usize, RequestError> {
    let &[major, dot, minor, ..] = &data[start..] else {
        return Err(ErrorKind::InvalidProtocolVersion.into());
    };
    expect_digit(major, start)?;
    if dot != b'.' {
        return Err(RequestError::unexpected(
            ErrorKind::InvalidProtocolVersion,
            "'.' between version digits",
            dot,
            start + 1,
        ));
    }
    expect_digit(minor, start + 2)?;
    Ok(start + 3)
}

fn scan_terminator(data: &[u8], at: usize) -> Result<(), RequestError> {
    match &data[at..] {
        [b'\n', ..] | [b'\r', b'\n', ..] => Ok(()),
        [] => Err(ErrorKind::MissingSeparator.into()),
        &[byte, ..] => Err(RequestError::unexpected(
            ErrorKind::MissingSeparator,
            "CRLF or LF after protocol version",
            byte,
            at,
        )),
    }
}
