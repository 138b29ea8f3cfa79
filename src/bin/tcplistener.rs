use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use wireline::{
    bind_listener, serve_lines, serve_request_lines, LinesConfig, ScanConfig, ServerConfig,
    SetupError, DEFAULT_ADDR,
};

/// Print every line received on every TCP connection.
#[derive(ClapParser)]
#[command(name = "tcplistener", version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Bytes requested per read.
    #[arg(long, default_value = "8")]
    chunk_size: usize,

    /// Lines buffered per connection before reading pauses.
    #[arg(long, default_value = "1")]
    channel_capacity: usize,

    /// Scan the request line at the head of each connection instead of
    /// printing lines.
    #[arg(long)]
    request_line: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.addr.clone(),
            lines: LinesConfig {
                chunk_size: self.chunk_size,
                channel_capacity: self.channel_capacity,
            },
            scan: ScanConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), SetupError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.server_config();

    let listener = bind_listener(&config.addr)
        .await
        .inspect_err(|err| tracing::error!("{err}"))?;
    tracing::info!(addr = %config.addr, "listening");

    if cli.request_line {
        serve_request_lines(listener, config.scan, config.lines.chunk_size, |peer, result| {
            match result {
                Ok(line) => println!("{peer}: {line}"),
                Err(err) => println!("{peer}: {err}"),
            }
        })
        .await;
    } else {
        serve_lines(listener, config.lines, |_, line| {
            println!("{}", String::from_utf8_lossy(&line));
        })
        .await;
    }
    Ok(())
}
