use crate::charset::{is_digit, is_tchar, is_vchar, is_whitespace};
use crate::error::{ErrorKind, RequestError};
use crate::types::RequestLine;

pub(crate) const VERSION_LITERAL: &[u8] = b"HTTP/";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Length limits applied while scanning a request line.
///
/// All sizes are in bytes.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum length of the method token (default: 72).
    pub max_method_len: usize,
    /// Maximum length of the request target (default: 8 192).
    pub max_target_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_method_len: 72,
            max_target_len: 8_192,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan status
// ---------------------------------------------------------------------------

/// Outcome of a [`RequestLineParser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// The request line, including its terminator, has been consumed.
    /// The contained value is the **total** number of bytes consumed so far
    /// (across all `feed` calls). Bytes past this offset belong to the
    /// header section and were not looked at.
    Complete(usize),
    /// The parser needs more data before the line is complete.
    Incomplete,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingMethod,
    AwaitingTarget,
    AwaitingVersionLiteral,
    AwaitingMajor,
    AwaitingDot,
    AwaitingMinor,
    AwaitingTerminator { seen_cr: bool },
    Done,
    Failed(ErrorKind),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// An incremental request-line parser that suspends mid-token.
///
/// Chunks may split the line anywhere, including between CR and LF. Once
/// the parser is done or has failed it stays that way until [`reset`].
///
/// # Usage
///
/// ```rust
/// use wireline::{RequestLineParser, ScanStatus};
///
/// let mut parser = RequestLineParser::new();
///
/// assert_eq!(parser.feed(b"GET /cof").unwrap(), ScanStatus::Incomplete);
/// assert_eq!(parser.feed(b"fee HTTP/1.1\r").unwrap(), ScanStatus::Incomplete);
/// assert_eq!(parser.feed(b"\nHost: x\r\n").unwrap(), ScanStatus::Complete(22));
///
/// let line = parser.finish().unwrap();
/// assert_eq!(line.target, "/coffee");
/// ```
///
/// [`reset`]: RequestLineParser::reset
pub struct RequestLineParser {
    state: State,
    config: ScanConfig,
    bytes_consumed: usize,

    method_buf: Vec<u8>,
    target_buf: Vec<u8>,
    literal_matched: usize,
    version: [u8; 3],
}

impl RequestLineParser {
    /// Create a new parser with default limits.
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a new parser with custom limits.
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            state: State::AwaitingMethod,
            config,
            bytes_consumed: 0,
            method_buf: Vec::with_capacity(8),
            target_buf: Vec::with_capacity(64),
            literal_matched: 0,
            version: [0; 3],
        }
    }

    /// Reset the parser so it can be reused for another request line.
    pub fn reset(&mut self) {
        self.state = State::AwaitingMethod;
        self.bytes_consumed = 0;
        self.method_buf.clear();
        self.target_buf.clear();
        self.literal_matched = 0;
        self.version = [0; 3];
    }

    /// Feed a slice of bytes into the parser.
    ///
    /// Consumption stops right after the line terminator; the rest of
    /// `data` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first violation found. The parser is then failed and
    /// every later call reports the same [`ErrorKind`].
    pub fn feed(&mut self, data: &[u8]) -> Result<ScanStatus, RequestError> {
        match self.state {
            State::Done => return Ok(ScanStatus::Complete(self.bytes_consumed)),
            State::Failed(kind) => return Err(RequestError::new(kind)),
            _ => {}
        }

        for &byte in data {
            let offset = self.bytes_consumed;
            self.bytes_consumed += 1;

            if let Err(err) = self.step(byte, offset) {
                self.state = State::Failed(err.kind());
                return Err(err);
            }
            if self.state == State::Done {
                return Ok(ScanStatus::Complete(self.bytes_consumed));
            }
        }

        Ok(ScanStatus::Incomplete)
    }

    fn step(&mut self, byte: u8, offset: usize) -> Result<(), RequestError> {
        match self.state {
            State::AwaitingMethod => {
                if byte == b' ' {
                    if self.method_buf.is_empty() {
                        return Err(ErrorKind::MissingMethod.into());
                    }
                    self.state = State::AwaitingTarget;
                } else if is_tchar(byte) {
                    if self.method_buf.len() >= self.config.max_method_len {
                        return Err(ErrorKind::MethodTooLong.into());
                    }
                    self.method_buf.push(byte);
                } else {
                    return Err(reject_method_byte(byte, offset));
                }
            }

            State::AwaitingTarget => {
                if byte == b' ' {
                    if self.target_buf.is_empty() {
                        return Err(ErrorKind::MissingTarget.into());
                    }
                    self.state = State::AwaitingVersionLiteral;
                } else if is_vchar(byte) {
                    if self.target_buf.len() >= self.config.max_target_len {
                        return Err(ErrorKind::TargetTooLong.into());
                    }
                    self.target_buf.push(byte);
                } else {
                    return Err(reject_target_byte(byte, offset));
                }
            }

            State::AwaitingVersionLiteral => {
                if byte != VERSION_LITERAL[self.literal_matched] {
                    return Err(RequestError::unexpected(
                        ErrorKind::InvalidProtocolLiteral,
                        "\"HTTP/\"",
                        byte,
                        offset,
                    ));
                }
                self.literal_matched += 1;
                if self.literal_matched == VERSION_LITERAL.len() {
                    self.state = State::AwaitingMajor;
                }
            }

            State::AwaitingMajor => {
                self.version[0] = expect_digit(byte, offset)?;
                self.state = State::AwaitingDot;
            }

            State::AwaitingDot => {
                if byte != b'.' {
                    return Err(RequestError::unexpected(
                        ErrorKind::InvalidProtocolVersion,
                        "'.' between version digits",
                        byte,
                        offset,
                    ));
                }
                self.version[1] = byte;
                self.state = State::AwaitingMinor;
            }

            State::AwaitingMinor => {
                self.version[2] = expect_digit(byte, offset)?;
                self.state = State::AwaitingTerminator { seen_cr: false };
            }

            State::AwaitingTerminator { seen_cr } => match byte {
                b'\n' => self.state = State::Done,
                b'\r' if !seen_cr => self.state = State::AwaitingTerminator { seen_cr: true },
                _ => {
                    return Err(RequestError::unexpected(
                        ErrorKind::MissingSeparator,
                        "CRLF or LF after protocol version",
                        byte,
                        offset,
                    ));
                }
            },

            // `feed` returns before stepping a finished parser.
            State::Done | State::Failed(_) => {
                unreachable!("terminal states are handled in feed");
            }
        }
        Ok(())
    }

    /// Consume the parser and return the parsed [`RequestLine`].
    ///
    /// # Errors
    ///
    /// Returns the recorded failure, or classifies where the input stopped
    /// when the line never completed.
    pub fn finish(self) -> Result<RequestLine, RequestError> {
        match self.state {
            State::Done => Ok(RequestLine::from_parts(
                &self.method_buf,
                &self.target_buf,
                &self.version,
            )),
            State::Failed(kind) => Err(kind.into()),
            State::AwaitingMethod if self.bytes_consumed == 0 => Err(ErrorKind::EmptyInput.into()),
            State::AwaitingVersionLiteral => Err(ErrorKind::InvalidProtocolLiteral.into()),
            State::AwaitingMajor | State::AwaitingDot | State::AwaitingMinor => {
                Err(ErrorKind::InvalidProtocolVersion.into())
            }
            State::AwaitingMethod | State::AwaitingTarget | State::AwaitingTerminator { .. } => {
                Err(ErrorKind::MissingSeparator.into())
            }
        }
    }

    /// Returns `true` once the line terminator has been consumed.
    pub fn is_complete(&self) -> bool {
        self.state == State::Done
    }

    /// Total number of bytes consumed across all `feed` calls.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }
}

impl Default for RequestLineParser {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Rejection helpers shared with the buffered scanner
// ---------------------------------------------------------------------------

pub(crate) fn reject_method_byte(byte: u8, offset: usize) -> RequestError {
    match byte {
        b'\r' | b'\n' => RequestError::unexpected(
            ErrorKind::MissingSeparator,
            "SP after method",
            byte,
            offset,
        ),
        b if is_whitespace(b) => RequestError::unexpected(
            ErrorKind::InvalidMethodByte,
            "a single SP after method",
            byte,
            offset,
        ),
        _ => RequestError::unexpected(
            ErrorKind::InvalidMethodByte,
            "token character or SP in request method",
            byte,
            offset,
        ),
    }
}

pub(crate) fn reject_target_byte(byte: u8, offset: usize) -> RequestError {
    match byte {
        b'\r' | b'\n' => RequestError::unexpected(
            ErrorKind::MissingSeparator,
            "SP after request target",
            byte,
            offset,
        ),
        b if is_whitespace(b) => RequestError::unexpected(
            ErrorKind::InvalidTargetByte,
            "a single SP after request target",
            byte,
            offset,
        ),
        _ => RequestError::unexpected(
            ErrorKind::InvalidTargetByte,
            "visible character or SP in request target",
            byte,
            offset,
        ),
    }
}

pub(crate) fn expect_digit(byte: u8, offset: usize) -> Result<u8, RequestError> {
    if is_digit(byte) {
        Ok(byte)
    } else {
        Err(RequestError::unexpected(
            ErrorKind::InvalidProtocolVersion,
            "version digit",
            byte,
            offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspends_inside_every_token() {
        let raw = b"PATCH /a/b?c=d HTTP/1.0\r\n";
        let mut parser = RequestLineParser::new();
        for &byte in &raw[..raw.len() - 1] {
            assert_eq!(parser.feed(&[byte]).unwrap(), ScanStatus::Incomplete);
        }
        assert_eq!(
            parser.feed(&raw[raw.len() - 1..]).unwrap(),
            ScanStatus::Complete(raw.len())
        );
        let line = parser.finish().unwrap();
        assert_eq!(line.method, "PATCH");
        assert_eq!(line.target, "/a/b?c=d");
        assert_eq!(line.version, "1.0");
    }

    #[test]
    fn split_between_cr_and_lf() {
        let mut parser = RequestLineParser::new();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r").unwrap(), ScanStatus::Incomplete);
        assert_eq!(parser.feed(b"\n").unwrap(), ScanStatus::Complete(16));
        assert!(parser.is_complete());
    }

    #[test]
    fn bare_lf_terminator() {
        let mut parser = RequestLineParser::new();
        assert_eq!(
            parser.feed(b"GET / HTTP/1.1\nrest").unwrap(),
            ScanStatus::Complete(15)
        );
        assert_eq!(parser.bytes_consumed(), 15);
    }

    #[test]
    fn done_is_terminal() {
        let mut parser = RequestLineParser::new();
        parser.feed(b"GET / HTTP/1.1\r\n").unwrap();
        assert_eq!(parser.feed(b"more").unwrap(), ScanStatus::Complete(16));
        assert_eq!(parser.bytes_consumed(), 16);
    }

    #[test]
    fn failed_is_terminal() {
        let mut parser = RequestLineParser::new();
        let err = parser.feed(b"G@T").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMethodByte);
        let again = parser.feed(b" / HTTP/1.1\r\n").unwrap_err();
        assert_eq!(again.kind(), ErrorKind::InvalidMethodByte);
        assert_eq!(parser.finish().unwrap_err().kind(), ErrorKind::InvalidMethodByte);
    }

    #[test]
    fn method_limit() {
        let mut parser = RequestLineParser::with_config(ScanConfig {
            max_method_len: 3,
            ..ScanConfig::default()
        });
        assert_eq!(parser.feed(b"GET").unwrap(), ScanStatus::Incomplete);
        assert_eq!(parser.feed(b"S").unwrap_err().kind(), ErrorKind::MethodTooLong);
    }

    #[test]
    fn target_limit() {
        let mut parser = RequestLineParser::with_config(ScanConfig {
            max_target_len: 4,
            ..ScanConfig::default()
        });
        assert_eq!(
            parser.feed(b"GET /abcd").unwrap_err().kind(),
            ErrorKind::TargetTooLong
        );
    }

    #[test]
    fn truncation_classification() {
        let cases: &[(&[u8], ErrorKind)] = &[
            (b"", ErrorKind::EmptyInput),
            (b"GE", ErrorKind::MissingSeparator),
            (b"GET /x", ErrorKind::MissingSeparator),
            (b"GET /x HT", ErrorKind::InvalidProtocolLiteral),
            (b"GET /x HTTP/", ErrorKind::InvalidProtocolVersion),
            (b"GET /x HTTP/1.", ErrorKind::InvalidProtocolVersion),
            (b"GET /x HTTP/1.1", ErrorKind::MissingSeparator),
            (b"GET /x HTTP/1.1\r", ErrorKind::MissingSeparator),
        ];
        for (input, kind) in cases {
            let mut parser = RequestLineParser::new();
            assert_eq!(parser.feed(input).unwrap(), ScanStatus::Incomplete);
            assert_eq!(parser.finish().unwrap_err().kind(), *kind, "input {input:?}");
        }
    }

    #[test]
    fn cr_must_be_followed_by_lf() {
        let mut parser = RequestLineParser::new();
        let err = parser.feed(b"GET / HTTP/1.1\r\r\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSeparator);
    }

    #[test]
    fn reset_allows_reuse() {
        let mut parser = RequestLineParser::new();
        assert!(parser.feed(b" / HTTP/1.1\r\n").is_err());
        parser.reset();
        assert_eq!(
            parser.feed(b"DELETE /x HTTP/1.1\n").unwrap(),
            ScanStatus::Complete(19)
        );
        assert_eq!(parser.finish().unwrap().method, "DELETE");
    }
}
