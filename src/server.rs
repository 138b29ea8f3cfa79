//! TCP listener and UDP sender around the line and request-line cores.

use bytes::Bytes;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};

use crate::error::{RequestError, SetupError};
use crate::lines::LinesConfig;
use crate::parser::ScanConfig;
use crate::stream::{line_channel, read_request_line};
use crate::types::RequestLine;

/// Default address shared by the listener and the sender.
pub const DEFAULT_ADDR: &str = "127.0.0.1:42069";

/// Settings for the TCP listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (default: `127.0.0.1:42069`).
    pub addr: String,
    pub lines: LinesConfig,
    pub scan: ScanConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            lines: LinesConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// Bind a TCP listener on `addr`.
pub async fn bind_listener(addr: &str) -> Result<TcpListener, SetupError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| SetupError::Bind {
            addr: addr.to_owned(),
            source,
        })
}

/// Accept connections forever, handing every line of every connection to
/// `on_line`.
///
/// Each connection runs in its own task with its own assembler.
pub async fn serve_lines<F>(listener: TcpListener, config: LinesConfig, on_line: F)
where
    F: Fn(SocketAddr, Bytes) + Send + Sync + 'static,
{
    let on_line = Arc::new(on_line);
    accept_loop(listener, move |stream, peer| {
        connection_lines(stream, peer, config.clone(), on_line.clone())
    })
    .await
}

/// Accept connections forever, scanning the request line at the head of
/// each one and handing the outcome to `on_request`.
pub async fn serve_request_lines<F>(
    listener: TcpListener,
    config: ScanConfig,
    chunk_size: usize,
    on_request: F,
) where
    F: Fn(SocketAddr, Result<RequestLine, RequestError>) + Send + Sync + 'static,
{
    let on_request = Arc::new(on_request);
    accept_loop(listener, move |mut stream, peer| {
        let config = config.clone();
        let on_request = on_request.clone();
        async move {
            let result = read_request_line(&mut stream, &config, chunk_size)
                .await
                .map(|(line, _)| line);
            on_request(peer, result);
        }
    })
    .await
}

async fn accept_loop<H, Fut>(listener: TcpListener, handler: H)
where
    H: Fn(TcpStream, SocketAddr) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted");
                tokio::spawn(handler(stream, peer));
            }
            Err(err) => {
                tracing::error!(error = %err, "accept failed");
            }
        }
    }
}

async fn connection_lines<F>(stream: TcpStream, peer: SocketAddr, config: LinesConfig, on_line: Arc<F>)
where
    F: Fn(SocketAddr, Bytes),
{
    let mut lines = line_channel(stream, &config);
    while let Some(item) = lines.recv().await {
        match item {
            Ok(line) => on_line(peer, line),
            Err(err) => tracing::warn!(%peer, error = %err, "connection read failed"),
        }
    }
    tracing::debug!(%peer, "connection closed");
}

/// Bind an ephemeral UDP socket and connect it to `addr`, preferring IPv4.
pub async fn connect_udp(addr: &str) -> Result<UdpSocket, SetupError> {
    let mut candidates = tokio::net::lookup_host(addr).await?.collect::<Vec<_>>();
    candidates.sort_by_key(|candidate| !candidate.is_ipv4());
    let Some(target) = candidates.first().copied() else {
        return Err(SetupError::Bind {
            addr: addr.to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "no address resolved"),
        });
    };

    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)
        .await
        .map_err(|source| SetupError::Bind {
            addr: local.to_string(),
            source,
        })?;
    socket.connect(target).await?;
    Ok(socket)
}

/// Forward each newline-terminated line of `input` as one datagram,
/// writing `>` to `prompt` before every read.
///
/// Lines are sent verbatim, including the `\n`. Returns the number of
/// datagrams sent once `input` is exhausted.
pub async fn send_lines<I, W>(mut input: I, socket: &UdpSocket, mut prompt: W) -> io::Result<usize>
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut sent = 0;
    loop {
        prompt.write_all(b">").await?;
        prompt.flush().await?;

        line.clear();
        if input.read_until(b'\n', &mut line).await? == 0 {
            return Ok(sent);
        }
        socket.send(&line).await?;
        sent += 1;
        tracing::trace!(bytes = line.len(), "datagram sent");
    }
}
