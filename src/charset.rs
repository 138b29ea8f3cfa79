//! Byte classes of the request-line grammar (RFC 7230 / RFC 9110).

/// `tchar`: characters allowed in HTTP tokens such as the method.
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
#[inline]
pub fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

/// `VCHAR`: visible, non-whitespace ASCII (0x21..=0x7E).
#[inline]
pub fn is_vchar(b: u8) -> bool {
    (0x21..=0x7E).contains(&b)
}

/// Horizontal whitespace that may surround tokens: SP, HTAB, CR, FF.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0C)
}

#[inline]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}
