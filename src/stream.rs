//! Async adapters that drive the line assembler and the request-line parser
//! from a tokio byte stream.

use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::error::RequestError;
use crate::lines::{LineAssembler, LinesConfig};
use crate::parser::{RequestLineParser, ScanConfig, ScanStatus};
use crate::types::RequestLine;

/// Spawn a task that splits `reader` into lines and hands them over a
/// bounded channel.
///
/// The task stops reading while `channel_capacity` lines are waiting, so a
/// slow consumer bounds memory. It ends, dropping `reader`, when the source
/// is exhausted, when a read fails (the error is the last item), or when
/// the receiver is dropped.
pub fn line_channel<R>(reader: R, config: &LinesConfig) -> mpsc::Receiver<io::Result<Bytes>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    tokio::spawn(pump_lines(reader, tx, config.chunk_size.max(1)));
    rx
}

async fn pump_lines<R>(mut reader: R, tx: mpsc::Sender<io::Result<Bytes>>, chunk_size: usize)
where
    R: AsyncRead + Unpin,
{
    let mut assembler = LineAssembler::new();
    let mut buf = vec![0; chunk_size];

    let failure = loop {
        let read = tokio::select! {
            read = reader.read(&mut buf) => read,
            _ = tx.closed() => {
                tracing::debug!("line consumer dropped, releasing source");
                return;
            }
        };
        let n = match read {
            Ok(0) => break None,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => break Some(err),
        };
        tracing::trace!(bytes = n, "chunk");
        for line in assembler.push(&buf[..n]) {
            if tx.send(Ok(line)).await.is_err() {
                tracing::debug!("line consumer dropped, releasing source");
                return;
            }
        }
    };

    if let Some(line) = assembler.finish() {
        if tx.send(Ok(line)).await.is_err() {
            return;
        }
    }
    if let Some(err) = failure {
        tracing::warn!(error = %err, "byte source failed");
        let _ = tx.send(Err(err)).await;
    }
}

/// Read just enough of `reader` to parse one request line.
///
/// Returns the line and any bytes that were read past its terminator (the
/// start of the header section).
///
/// # Errors
///
/// Parse failures are reported as soon as the offending byte arrives. A
/// read failure is [`ErrorKind::UpstreamReadFailure`]; end of input before
/// the terminator is classified by where the line stopped.
///
/// [`ErrorKind::UpstreamReadFailure`]: crate::ErrorKind::UpstreamReadFailure
pub async fn read_request_line<R>(
    reader: &mut R,
    config: &ScanConfig,
    chunk_size: usize,
) -> Result<(RequestLine, Bytes), RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestLineParser::with_config(config.clone());
    let mut buf = vec![0; chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(RequestError::upstream(err)),
        };
        if n == 0 {
            return parser.finish().map(|line| (line, Bytes::new()));
        }

        let before = parser.bytes_consumed();
        if let ScanStatus::Complete(total) = parser.feed(&buf[..n])? {
            let rest = Bytes::copy_from_slice(&buf[total - before..n]);
            return Ok((parser.finish()?, rest));
        }
    }
}
