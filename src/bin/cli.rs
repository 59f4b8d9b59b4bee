use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rawreq::{
    format_debug, format_json, format_summary, DuplicateKeys, ParserConfig, RequestParser,
};

/// Break a raw HTTP/1.1 request into method, path, headers, cookies,
/// query parameters and form fields.
///
/// The request text comes from FILE, from --raw, or from piped stdin.
/// Inside --raw the sequences \r \n \t and \\ stand for CR, LF, tab and
/// backslash, so a whole request fits in one shell argument.
#[derive(ClapParser)]
#[command(name = "rawreq-cli", version, about, long_about = None)]
struct Cli {
    /// File holding the request text (stdin is used when FILE and --raw
    /// are both absent).
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Request text given inline, with \r \n \t \\ escapes.
    #[arg(long)]
    raw: Option<String>,

    /// How the parsed request is printed.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Indent the JSON output (no effect on debug or summary).
    #[arg(short, long)]
    pretty: bool,

    /// Reject requests longer than this many bytes.
    #[arg(long, default_value = "1048576")]
    max_request_len: usize,

    /// Reject requests with more header lines than this.
    #[arg(long, default_value = "128")]
    max_headers: usize,

    /// Let a repeated query/form parameter overwrite the earlier value
    /// instead of rejecting the request.
    #[arg(long)]
    last_wins: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// serde JSON of the whole request
    Json,
    /// Sectioned dump including cookies and parameters
    Debug,
    /// Method, URL and headers only
    Summary,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    // Nothing to read from an interactive terminal.
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let text = match read_input(&cli) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("cannot read request: {e}");
            process::exit(1);
        }
    };

    if text.is_empty() {
        eprintln!("no request text given");
        process::exit(1);
    }

    let config = ParserConfig {
        max_request_len: cli.max_request_len,
        max_headers_count: cli.max_headers,
        duplicate_keys: if cli.last_wins {
            DuplicateKeys::LastWins
        } else {
            DuplicateKeys::Reject
        },
    };
    debug!(?config, bytes = text.len(), "parsing request");

    let request = match RequestParser::with_config(config).parse(&text) {
        Ok(r) => r,
        Err(e) => {
            warn!(reason = ?e.reason(), "rejecting request");
            eprintln!("{} Bad Request: {e}", e.status_code());
            process::exit(2);
        }
    };
    debug!(method = %request.method(), path = request.path(), "request parsed");

    let output = match cli.format {
        OutputFormat::Json => format_json(&request, cli.pretty),
        OutputFormat::Debug => format_debug(&request),
        OutputFormat::Summary => format_summary(&request),
    };

    print!("{output}");
}

/// Collect the request text; --raw wins over FILE, FILE over stdin.
fn read_input(cli: &Cli) -> Result<String, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw));
    }
    match &cli.file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Turn the `\r`, `\n`, `\t` and `\\` escapes of `--raw` into real characters.
/// Unknown escapes and a trailing backslash pass through untouched.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let expanded = match chars.peek() {
            Some('r') => '\r',
            Some('n') => '\n',
            Some('t') => '\t',
            Some('\\') => '\\',
            _ => {
                out.push('\\');
                continue;
            }
        };
        chars.next();
        out.push(expanded);
    }
    out
}
