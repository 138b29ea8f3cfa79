use serde::Serialize;
use std::fmt;

/// A validated HTTP/1.x request line.
///
/// Every field is non-empty and pure ASCII: `method` holds token bytes,
/// `target` visible bytes, and `version` is exactly `<digit>.<digit>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestLine {
    /// The request method token (e.g. `GET`).
    pub method: String,
    /// The request target, opaque (e.g. `/coffee?x=1`).
    pub target: String,
    /// The protocol version without the `HTTP/` prefix (e.g. `1.1`).
    pub version: String,
}

impl RequestLine {
    pub(crate) fn from_parts(method: &[u8], target: &[u8], version: &[u8]) -> Self {
        Self {
            method: ascii_to_string(method),
            target: ascii_to_string(target),
            version: ascii_to_string(version),
        }
    }

    /// Major version digit.
    pub fn major(&self) -> Option<u8> {
        version_digit(&self.version, 0)
    }

    /// Minor version digit.
    pub fn minor(&self) -> Option<u8> {
        version_digit(&self.version, 2)
    }

    /// Serialize back to wire form, terminated by CRLF.
    pub fn to_wire(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.version)
    }
}

fn version_digit(version: &str, index: usize) -> Option<u8> {
    version
        .as_bytes()
        .get(index)
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

// Callers only pass bytes that passed a tchar/vchar/digit check.
fn ascii_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
