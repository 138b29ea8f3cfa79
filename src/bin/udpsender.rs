use clap::Parser as ClapParser;
use tokio::io::{stdin, stdout, BufReader};
use tracing_subscriber::EnvFilter;

use wireline::{connect_udp, send_lines};

/// Send each line typed on stdin as one UDP datagram.
#[derive(ClapParser)]
#[command(name = "udpsender", version, about, long_about = None)]
struct Cli {
    /// Destination address.
    #[arg(long, default_value = "localhost:42069")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let socket = connect_udp(&cli.addr)
        .await
        .inspect_err(|err| tracing::error!("{err}"))?;

    let sent = send_lines(BufReader::new(stdin()), &socket, stdout())
        .await
        .inspect_err(|err| tracing::error!("{err}"))?;
    tracing::info!(sent, "input closed");
    Ok(())
}
