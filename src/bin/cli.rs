use std::fs::File;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{Args, CommandFactory, Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

use wireline::{
    format_debug, format_error, format_json, format_wire, parse_request_line_incremental,
    parse_request_line_with_config, Lines, LinesConfig, ScanConfig,
};

/// wireline CLI: request-line scanner and line splitter.
#[derive(ClapParser)]
#[command(name = "wireline-cli", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the HTTP request line at the head of a raw request.
    ///
    /// Reads from a file, --raw string, or stdin. Escape sequences
    /// (\r, \n, \t, \\) in the --raw value are interpreted so you can pass
    /// a full request as a single shell argument.
    Request(RequestArgs),
    /// Print every newline-delimited line of a file as `read: <line>`.
    Lines(LinesArgs),
}

#[derive(Args)]
struct RequestArgs {
    /// Path to a file containing a raw HTTP request.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Use the incremental parser instead of the buffered scanner.
    #[arg(long)]
    incremental: bool,

    /// Maximum method length in bytes.
    #[arg(long, default_value = "72")]
    max_method_len: usize,

    /// Maximum request-target length in bytes.
    #[arg(long, default_value = "8192")]
    max_target_len: usize,
}

#[derive(Args)]
struct LinesArgs {
    /// File to split into lines.
    #[arg(value_name = "FILE", default_value = "public_html/messages.txt")]
    file: PathBuf,

    /// Bytes requested per read.
    #[arg(long, default_value = "8")]
    chunk_size: usize,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// The request line as it appears on the wire
    Wire,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Request(args) => run_request(&args),
        Command::Lines(args) => run_lines(&args),
    };
    process::exit(code);
}

fn run_request(args: &RequestArgs) -> i32 {
    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if args.file.is_none() && args.raw.is_none() && std::io::stdin().is_terminal() {
        let mut cmd = Cli::command();
        if let Some(request) = cmd.find_subcommand_mut("request") {
            request.print_help().ok();
        }
        println!();
        return 0;
    }

    let data = match read_input(args) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            return 1;
        }
    };

    let config = ScanConfig {
        max_method_len: args.max_method_len,
        max_target_len: args.max_target_len,
    };

    let result = if args.incremental {
        parse_request_line_incremental(&data, config)
    } else {
        parse_request_line_with_config(&data, &config)
    };

    let line = match result {
        Ok(line) => line,
        Err(e) => {
            eprintln!("Parse error: {e}");
            if matches!(args.format, OutputFormat::Json) {
                println!("{}", format_error(&e));
            }
            return 2;
        }
    };

    let output = match args.format {
        OutputFormat::Json => format!("{}\n", format_json(&line, args.pretty)),
        OutputFormat::Debug => format_debug(&line),
        OutputFormat::Wire => format_wire(&line),
    };

    print!("{output}");
    0
}

fn run_lines(args: &LinesArgs) -> i32 {
    let file = match File::open(&args.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening {}: {e}", args.file.display());
            return 1;
        }
    };

    let config = LinesConfig {
        chunk_size: args.chunk_size,
        ..LinesConfig::default()
    };
    for line in Lines::with_config(file, &config) {
        match line {
            Ok(line) => println!("read: {}", String::from_utf8_lossy(&line)),
            Err(e) => {
                eprintln!("Error reading {}: {e}", args.file.display());
                return 1;
            }
        }
    }
    0
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(args: &RequestArgs) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &args.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &args.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
