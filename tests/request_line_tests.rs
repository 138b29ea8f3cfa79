use std::error::Error;
use std::io::{self, Read};

use wireline::{
    format_debug, format_error, format_json, format_wire, parse_request_line,
    parse_request_line_incremental, parse_request_line_with_config, request_from_reader,
    ErrorKind, RequestLineParser, ScanConfig, ScanStatus, UnexpectedByte,
};

const CURL_REQUEST: &[u8] =
    b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

/// Yields at most `per_read` bytes per call, like a slow network peer.
struct ChunkReader {
    data: Vec<u8>,
    per_read: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &[u8], per_read: usize) -> Self {
        Self {
            data: data.to_vec(),
            per_read,
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let end = (self.pos + self.per_read).min(self.data.len());
        let n = (end - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"))
    }
}

fn kind_of(data: &[u8]) -> ErrorKind {
    parse_request_line(data).unwrap_err().kind()
}

// =========================================================================
// Buffered scanning
// =========================================================================

#[test]
fn good_get_request_line() {
    let line = request_from_reader(ChunkReader::new(CURL_REQUEST, 3)).expect("should parse");
    assert_eq!(line.method, "GET");
    assert_eq!(line.target, "/");
    assert_eq!(line.version, "1.1");
}

#[test]
fn good_get_request_line_with_path() {
    let raw = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
    let line = request_from_reader(ChunkReader::new(raw, 1)).expect("should parse");
    assert_eq!(line.method, "GET");
    assert_eq!(line.target, "/coffee");
    assert_eq!(line.version, "1.1");
}

#[test]
fn good_post_with_query_target() {
    let line = parse_request_line(b"POST /api/users?page=1&limit=10 HTTP/1.0\r\n").unwrap();
    assert_eq!(line.method, "POST");
    assert_eq!(line.target, "/api/users?page=1&limit=10");
    assert_eq!(line.version, "1.0");
    assert_eq!((line.major(), line.minor()), (Some(1), Some(0)));
}

#[test]
fn extension_methods_and_asterisk_target() {
    for raw in [
        &b"OPTIONS * HTTP/1.1\r\n"[..],
        b"M-SEARCH * HTTP/1.1\r\n",
        b"PROPFIND /dav HTTP/1.1\n",
        b"X~!#$%&'*+-.^_`| / HTTP/1.1\r\n",
    ] {
        assert!(parse_request_line(raw).is_ok(), "{:?}", String::from_utf8_lossy(raw));
    }
}

#[test]
fn any_digit_version_is_syntactically_valid() {
    let line = parse_request_line(b"GET / HTTP/9.7\r\n").unwrap();
    assert_eq!(line.version, "9.7");
}

#[test]
fn request_line_without_method_is_rejected() {
    let err = request_from_reader(ChunkReader::new(
        b"/coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n",
        3,
    ))
    .unwrap_err();
    assert_eq!(err.code(), 400);
    assert_eq!(err.kind(), ErrorKind::InvalidMethodByte);
}

#[test]
fn leading_space_is_missing_method() {
    assert_eq!(kind_of(b" / HTTP/1.1\r\nHost: h\r\n\r\n"), ErrorKind::MissingMethod);
}

#[test]
fn double_space_is_missing_target() {
    assert_eq!(kind_of(b"GET  HTTP/1.1\r\nHost: h\r\n\r\n"), ErrorKind::MissingTarget);
}

#[test]
fn short_input_is_too_short() {
    assert_eq!(kind_of(b"GET / HTTP\n"), ErrorKind::TooShort);
    assert_eq!(kind_of(b"GET / HTTP/"), ErrorKind::TooShort);
}

#[test]
fn empty_input() {
    let err = request_from_reader(io::empty()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert_eq!(err.code(), 400);
}

#[test]
fn invalid_version() {
    assert_eq!(kind_of(b"GET / HTTP/1.x\r\n\r\n"), ErrorKind::InvalidProtocolVersion);
}

#[test]
fn invalid_protocol_literal() {
    assert_eq!(kind_of(b"GET / FTP/1.1\r\n\r\n"), ErrorKind::InvalidProtocolLiteral);
}

#[test]
fn bracket_bytes_are_not_token_bytes() {
    for raw in [&b"G[T / HTTP/1.1\r\n"[..], b"G\\T / HTTP/1.1\r\n", b"G]T / HTTP/1.1\r\n"] {
        assert_eq!(kind_of(raw), ErrorKind::InvalidMethodByte);
    }
}

#[test]
fn tab_separator_is_rejected() {
    assert_eq!(kind_of(b"GET\t/ HTTP/1.1\r\n"), ErrorKind::InvalidMethodByte);
    assert_eq!(kind_of(b"GET /\tHTTP/1.1\r\n"), ErrorKind::InvalidTargetByte);
}

#[test]
fn line_ending_inside_target_is_missing_separator() {
    assert_eq!(kind_of(b"GET /coffee\r\nHost: h\r\n\r\n"), ErrorKind::MissingSeparator);
}

#[test]
fn target_without_trailing_space_is_missing_separator() {
    assert_eq!(kind_of(b"GET /abcdefghijkl"), ErrorKind::MissingSeparator);
}

#[test]
fn oversized_target() {
    let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(8_192));
    assert_eq!(kind_of(raw.as_bytes()), ErrorKind::TargetTooLong);

    let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(8_190));
    assert!(parse_request_line(raw.as_bytes()).is_ok());
}

#[test]
fn oversized_method() {
    let raw = format!("{} / HTTP/1.1\r\n\r\n", "A".repeat(73));
    assert_eq!(kind_of(raw.as_bytes()), ErrorKind::MethodTooLong);

    let raw = format!("{} / HTTP/1.1\r\n\r\n", "A".repeat(72));
    assert!(parse_request_line(raw.as_bytes()).is_ok());
}

#[test]
fn config_limits_apply() {
    let config = ScanConfig {
        max_method_len: 4,
        max_target_len: 2,
    };
    assert!(parse_request_line_with_config(b"POST /a HTTP/1.1\r\n", &config).is_ok());
    assert_eq!(
        parse_request_line_with_config(b"PATCH /a HTTP/1.1\r\n", &config)
            .unwrap_err()
            .kind(),
        ErrorKind::MethodTooLong
    );
    assert_eq!(
        parse_request_line_with_config(b"POST /ab HTTP/1.1\r\n", &config)
            .unwrap_err()
            .kind(),
        ErrorKind::TargetTooLong
    );
}

#[test]
fn upstream_failure_is_500_with_io_source() {
    let err = request_from_reader(FailingReader).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamReadFailure);
    assert_eq!(err.code(), 500);
    let io_err = err
        .source()
        .and_then(|s| s.downcast_ref::<io::Error>())
        .expect("io source");
    assert_eq!(io_err.kind(), io::ErrorKind::ConnectionReset);
}

#[test]
fn byte_rejection_carries_offset() {
    let err = parse_request_line(b"GET /a\x01b HTTP/1.1\r\n").unwrap_err();
    let cause = err
        .source()
        .and_then(|s| s.downcast_ref::<UnexpectedByte>())
        .expect("byte cause");
    assert_eq!(cause.found, 0x01);
    assert_eq!(cause.offset, 6);
    assert!(err.to_string().starts_with("400: bogus byte in request target"));
}

#[test]
fn every_parse_error_maps_to_400() {
    for kind in [
        ErrorKind::EmptyInput,
        ErrorKind::TooShort,
        ErrorKind::MissingMethod,
        ErrorKind::InvalidMethodByte,
        ErrorKind::MethodTooLong,
        ErrorKind::MissingTarget,
        ErrorKind::InvalidTargetByte,
        ErrorKind::TargetTooLong,
        ErrorKind::MissingSeparator,
        ErrorKind::InvalidProtocolLiteral,
        ErrorKind::InvalidProtocolVersion,
    ] {
        assert_eq!(kind.status_code(), 400, "{kind:?}");
    }
    assert_eq!(ErrorKind::UpstreamReadFailure.status_code(), 500);
}

// =========================================================================
// Round trip
// =========================================================================

#[test]
fn reparsing_the_wire_form_is_idempotent() {
    for raw in [
        CURL_REQUEST,
        b"GET /coffee HTTP/1.1\r\n",
        b"DELETE /a/b?c=%20 HTTP/1.0\n",
        b"OPTIONS * HTTP/2.0\r\n",
    ] {
        let first = parse_request_line(raw).unwrap();
        let second = parse_request_line(&first.to_wire()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_wire(), second.to_wire());
    }
}

// =========================================================================
// Incremental parsing
// =========================================================================

#[test]
fn incremental_matches_buffered_for_every_split() {
    let raw = b"GET /coffee HTTP/1.1\r\nHost: h\r\n\r\n";
    let expected = parse_request_line(raw).unwrap();

    for split in 0..=raw.len() {
        let mut parser = RequestLineParser::new();
        let first = parser.feed(&raw[..split]).unwrap();
        if first == ScanStatus::Incomplete {
            let status = parser.feed(&raw[split..]).unwrap();
            assert_eq!(status, ScanStatus::Complete(22), "split at {split}");
        }
        assert_eq!(parser.finish().unwrap(), expected, "split at {split}");
    }
}

#[test]
fn incremental_byte_by_byte() {
    let mut parser = RequestLineParser::new();
    let raw = b"GET / HTTP/1.1\r\n";
    for &byte in &raw[..raw.len() - 1] {
        assert_eq!(parser.feed(&[byte]).unwrap(), ScanStatus::Incomplete);
    }
    assert_eq!(parser.feed(b"\n").unwrap(), ScanStatus::Complete(raw.len()));
    assert!(parser.is_complete());
}

#[test]
fn incremental_rejects_at_the_offending_byte() {
    let mut parser = RequestLineParser::new();
    assert_eq!(parser.feed(b"GET / HTTP/1.").unwrap(), ScanStatus::Incomplete);
    let err = parser.feed(b"x\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidProtocolVersion);
    assert_eq!(parser.bytes_consumed(), 14);
}

#[test]
fn incremental_agrees_on_error_kinds() {
    for raw in [
        &b" / HTTP/1.1\r\n"[..],
        b"GET  HTTP/1.1\r\n",
        b"G@T / HTTP/1.1\r\n",
        b"GET / HTTP/1.x\r\n",
        b"GET / HTTPS/1.1\r\n",
        b"GET /a\x7F HTTP/1.1\r\n",
        b"GET / HTTP/1.1 \r\n",
    ] {
        let buffered = parse_request_line(raw).unwrap_err().kind();
        let incremental = parse_request_line_incremental(raw, ScanConfig::default())
            .unwrap_err()
            .kind();
        assert_eq!(buffered, incremental, "{:?}", String::from_utf8_lossy(raw));
    }
}

#[test]
fn incremental_has_no_minimum_length() {
    let line = parse_request_line_incremental(b"A / HTTP/1.1\n", ScanConfig::default()).unwrap();
    assert_eq!(line.method, "A");
    assert_eq!(
        parse_request_line_incremental(b"", ScanConfig::default())
            .unwrap_err()
            .kind(),
        ErrorKind::EmptyInput
    );
}

// =========================================================================
// Output formatting
// =========================================================================

#[test]
fn json_output_compact() {
    let line = parse_request_line(CURL_REQUEST).unwrap();
    let json = format_json(&line, false);
    assert_eq!(json, r#"{"method":"GET","target":"/","version":"1.1"}"#);
}

#[test]
fn json_output_pretty() {
    let line = parse_request_line(b"GET /pretty HTTP/1.1\r\n").unwrap();
    let json = format_json(&line, true);
    assert!(json.contains('\n'));
    assert!(json.contains("  \"target\": \"/pretty\""));
}

#[test]
fn debug_output_contains_fields() {
    let line = parse_request_line(b"GET /test HTTP/1.1\r\n").unwrap();
    let dbg = format_debug(&line);
    assert!(dbg.contains("=== Request Line ==="));
    assert!(dbg.contains("Method:  GET"));
    assert!(dbg.contains("Target:  /test"));
    assert!(dbg.contains("Version: 1.1"));
}

#[test]
fn wire_output() {
    let line = parse_request_line(b"GET /path HTTP/1.1\r\n").unwrap();
    assert_eq!(format_wire(&line), "GET /path HTTP/1.1\n");
}

#[test]
fn error_output_is_json() {
    let err = parse_request_line(b"GET / HTTP/1.x\r\n\r\n").unwrap_err();
    let value: serde_json::Value = serde_json::from_str(&format_error(&err)).unwrap();
    assert_eq!(value["code"], 400);
    assert_eq!(value["kind"], "InvalidProtocolVersion");
    assert!(value["cause"].as_str().unwrap().contains("0x78"));
}
