use std::error::Error as StdError;
use std::{fmt, io};

/// Classification of a request-line failure.
///
/// The kind is the stable identity of an error; the message attached to it
/// is diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// The byte source produced no data at all.
    #[error("empty request")]
    EmptyInput,
    /// Fewer bytes than the shortest possible request line.
    #[error("too short request")]
    TooShort,
    /// The line starts with a space, so there is no method token.
    #[error("no method in request")]
    MissingMethod,
    /// A byte outside the token set appeared inside the method.
    #[error("bogus byte in request method")]
    InvalidMethodByte,
    /// No space was found within the method length limit.
    #[error("request method too long")]
    MethodTooLong,
    /// Two consecutive spaces: the request target is empty.
    #[error("no target in request")]
    MissingTarget,
    /// A byte outside visible ASCII appeared inside the target.
    #[error("bogus byte in request target")]
    InvalidTargetByte,
    /// The target exceeds the configured length limit.
    #[error("request target too long")]
    TargetTooLong,
    /// A required SP or line terminator is absent.
    #[error("missing separator in request line")]
    MissingSeparator,
    /// The `HTTP/` literal is absent or misspelled.
    #[error("bogus protocol in request")]
    InvalidProtocolLiteral,
    /// The version is not `<digit>.<digit>`.
    #[error("bogus protocol version in request")]
    InvalidProtocolVersion,
    /// Reading from the byte source failed.
    #[error("failed to read request")]
    UpstreamReadFailure,
}

impl ErrorKind {
    /// HTTP status a caller should answer with for this kind of failure.
    pub fn status_code(self) -> u16 {
        match self {
            Self::UpstreamReadFailure => 500,
            _ => 400,
        }
    }
}

/// A failed request-line parse: an [`ErrorKind`] plus an optional cause.
#[derive(Debug)]
pub struct RequestError {
    kind: ErrorKind,
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl RequestError {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, cause: None }
    }

    pub(crate) fn unexpected(
        kind: ErrorKind,
        expected: &'static str,
        found: u8,
        offset: usize,
    ) -> Self {
        Self {
            kind,
            cause: Some(Box::new(UnexpectedByte {
                expected,
                found,
                offset,
            })),
        }
    }

    pub(crate) fn upstream(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::UpstreamReadFailure,
            cause: Some(Box::new(err)),
        }
    }

    /// The failure classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Status code for the failure: 400 for malformed input, 500 for I/O.
    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl From<ErrorKind> for RequestError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.kind)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

impl StdError for RequestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// The byte that stopped a scan, and where it sat in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected byte 0x{found:02X} at offset {offset} (expected {expected})")]
pub struct UnexpectedByte {
    /// Human-readable description of what was expected.
    pub expected: &'static str,
    /// The actual byte value found.
    pub found: u8,
    /// Offset of the byte from the start of the request line.
    pub offset: usize,
}

/// Failure to set up a listener or socket.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}
