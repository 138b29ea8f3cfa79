//! Reassembly of newline-delimited lines from arbitrarily chunked input.

use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::io::{self, Read};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Read sizing for line consumers.
#[derive(Debug, Clone)]
pub struct LinesConfig {
    /// Size of each read from the byte source (default: 8).
    pub chunk_size: usize,
    /// Lines that may wait in the async hand-off before the reader
    /// pauses (default: 1).
    pub channel_capacity: usize,
}

impl Default for LinesConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8,
            channel_capacity: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// LineAssembler
// ---------------------------------------------------------------------------

/// Sans-I/O line splitter that keeps the unterminated tail between chunks.
///
/// Lines are split on `\n`, which is dropped. A `\r` before it is kept.
///
/// ```rust
/// use wireline::LineAssembler;
///
/// let mut assembler = LineAssembler::new();
/// assert!(assembler.push(b"foo").is_empty());
/// assert_eq!(assembler.push(b"\nba"), vec!["foo"]);
/// assert_eq!(assembler.push(b"r\nb"), vec!["bar"]);
/// assert!(assembler.push(b"a").is_empty());
/// assert_eq!(assembler.finish().as_deref(), Some(&b"ba"[..]));
/// ```
#[derive(Debug, Default)]
pub struct LineAssembler {
    // Never contains `\n`.
    carry: BytesMut,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.carry.extend_from_slice(&rest[..pos]);
            lines.push(self.carry.split().freeze());
            rest = &rest[pos + 1..];
        }
        self.carry.extend_from_slice(rest);
        lines
    }

    /// Flush the unterminated tail as a final line, if there is one.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.carry.is_empty() {
            None
        } else {
            Some(self.carry.split().freeze())
        }
    }

    /// Bytes received since the last `\n`.
    pub fn carry(&self) -> &[u8] {
        &self.carry
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Blocking iterator over the lines of a [`Read`] source.
///
/// The source is read `chunk_size` bytes at a time and dropped exactly once,
/// when the sequence ends. A read error ends the sequence: lines already
/// buffered and the unterminated tail come first, then the error.
pub struct Lines<R> {
    source: Option<R>,
    assembler: LineAssembler,
    pending: VecDeque<Bytes>,
    buf: Vec<u8>,
    error: Option<io::Error>,
}

impl<R: Read> Lines<R> {
    pub fn new(source: R) -> Self {
        Self::with_config(source, &LinesConfig::default())
    }

    pub fn with_config(source: R, config: &LinesConfig) -> Self {
        Self {
            source: Some(source),
            assembler: LineAssembler::new(),
            pending: VecDeque::new(),
            buf: vec![0; config.chunk_size.max(1)],
            error: None,
        }
    }

    fn release(&mut self, error: Option<io::Error>) {
        self.pending.extend(self.assembler.finish());
        self.error = error;
        self.source = None;
    }
}

impl<R: Read> Iterator for Lines<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            let Some(source) = self.source.as_mut() else {
                return self.error.take().map(Err);
            };
            match source.read(&mut self.buf) {
                Ok(0) => self.release(None),
                Ok(n) => self.pending.extend(self.assembler.push(&self.buf[..n])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => self.release(Some(err)),
            }
        }
    }
}
