use std::fs;
use std::io::{self, Read, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use kvcast_core::{
    Datagram, DatagramFilter, DatagramSource, MulticastConfig, MulticastSource, OutputFormat,
    PairSink, PcapFileSource, SessionOptions, SessionSummary, SourceError, run_session,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KVCAST_LOGLEVEL";

#[derive(Parser, Debug)]
#[command(name = "kvcast")]
#[command(version)]
#[command(
    about = "Receive multicast datagrams and decode their key:value payloads.",
    long_about = None,
    after_help = "Examples:\n  kvcast listen 239.0.0.1 5000\n  kvcast decode payload.txt\n  kvcast pcap decode capture.pcapng --group 239.0.0.1 --port 5000"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Join a multicast group and print decoded pairs until interrupted.
    Listen {
        /// IPv4 multicast group (224.0.0.0/4)
        group: String,

        /// UDP port (1-65535)
        port: String,

        /// Local interface address used for the membership
        #[arg(long, default_value = "0.0.0.0")]
        interface: String,

        #[command(flatten)]
        output: OutputArgs,

        /// Stop after this many datagrams
        #[arg(long)]
        count: Option<u64>,
    },
    /// Decode one file (or `-` for stdin) as a single datagram payload.
    Decode {
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Exit with a non-zero code if the payload is malformed
        #[arg(long)]
        strict: bool,
    },
    /// Operations on PCAP/PCAPNG captures.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Replay UDP datagrams from a capture through the decoder.
    #[command(alias = "replay")]
    Decode {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Keep only datagrams sent to this IPv4 group
        #[arg(long)]
        group: Option<String>,

        /// Keep only datagrams sent to this UDP port
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        output: OutputArgs,

        /// Exit with a non-zero code if any datagram is malformed
        #[arg(long)]
        strict: bool,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format for decoded pairs
    #[arg(long, value_enum, default_value_t = FormatArg::Table)]
    format: FormatArg,

    /// Suppress status output
    #[arg(long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Listen {
            group,
            port,
            interface,
            output,
            count,
        } => cmd_listen(&group, &port, &interface, &output, count),
        Commands::Decode {
            input,
            output,
            strict,
        } => cmd_decode(&input, &output, strict),
        Commands::Pcap { command } => match command {
            PcapCommands::Decode {
                input,
                group,
                port,
                output,
                strict,
            } => cmd_pcap_decode(&input, group.as_deref(), port, &output, strict),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => std::env::var("RUST_LOG")
            .or_else(|_| std::env::var(LOG_ENV))
            .unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::builder().parse_lossy(filter))
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_listen(
    group: &str,
    port: &str,
    interface: &str,
    output: &OutputArgs,
    count: Option<u64>,
) -> Result<(), CliError> {
    let group_addr = parse_ipv4(group, "multicast group")?;
    let port = parse_port(port)?;
    let interface = parse_ipv4(interface, "interface")?;
    let config = MulticastConfig::new(group_addr, port)
        .map_err(config_error)?
        .with_interface(interface);

    let mut source = MulticastSource::join(&config).map_err(|err| {
        CliError::new(
            format!("failed to join multicast group {group}:{port}: {err}"),
            Some("check the interface address and that multicast is routed on it".to_string()),
        )
    })?;

    if !output.quiet {
        let mut stdout = io::stdout();
        writeln!(stdout, "Joined multicast group {group}:{port}")
            .and_then(|()| stdout.flush())
            .context("Failed to write to stdout")?;
    }

    let options = SessionOptions {
        max_datagrams: count,
    };
    run(&mut source, output.format.into(), &options)?;
    Ok(())
}

fn cmd_decode(input: &Path, output: &OutputArgs, strict: bool) -> Result<(), CliError> {
    let payload = read_payload(input)?;
    info!(len = payload.len(), "decoding payload");
    let mut source = kvcast_core::MemorySource::new([Datagram::new(&payload, None, None)]);
    let summary = run(&mut source, output.format.into(), &SessionOptions::default())?;
    finish(&summary, output.quiet, strict)
}

fn cmd_pcap_decode(
    input: &Path,
    group: Option<&str>,
    port: Option<u16>,
    output: &OutputArgs,
    strict: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(input)?;
    validate_input_file(&resolved_input)?;
    let filter = DatagramFilter {
        group: group
            .map(|group| parse_ipv4(group, "multicast group"))
            .transpose()?,
        port,
    };

    info!(input = %resolved_input.display(), ?filter, "replaying capture");
    let mut source = PcapFileSource::open_filtered(&resolved_input, filter)
        .with_context(|| format!("Failed to open capture: {}", resolved_input.display()))?;
    let summary = run(&mut source, output.format.into(), &SessionOptions::default())?;
    finish(&summary, output.quiet, strict)
}

fn run<S: DatagramSource>(
    source: &mut S,
    format: OutputFormat,
    options: &SessionOptions,
) -> Result<SessionSummary, CliError> {
    let stdout = io::stdout();
    let mut sink = PairSink::new(format, stdout.lock(), io::stderr());
    let summary = run_session(source, &mut sink, options).context("decode session failed")?;
    Ok(summary)
}

fn finish(summary: &SessionSummary, quiet: bool, strict: bool) -> Result<(), CliError> {
    if !quiet {
        eprintln!(
            "OK: {} datagrams, {} pairs, {} decode errors",
            summary.datagrams, summary.pairs, summary.decode_errors
        );
    }
    if strict && summary.decode_errors > 0 {
        return Err(CliError::new(
            "decode errors detected",
            Some("drop --strict to skip malformed payloads".to_string()),
        ));
    }
    Ok(())
}

fn read_payload(input: &Path) -> Result<Vec<u8>, CliError> {
    if input.as_os_str() == "-" {
        let mut payload = Vec::new();
        io::stdin()
            .read_to_end(&mut payload)
            .context("Failed to read payload from stdin")?;
        return Ok(payload);
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a payload file, or - to read stdin".to_string()),
        ));
    }
    let payload = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    Ok(payload)
}

fn parse_ipv4(value: &str, what: &str) -> Result<Ipv4Addr, CliError> {
    value.parse::<Ipv4Addr>().map_err(|_| {
        CliError::new(
            format!("invalid {what} address '{value}'"),
            Some("expected a dotted IPv4 address such as 239.0.0.1".to_string()),
        )
    })
}

fn parse_port(value: &str) -> Result<u16, CliError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CliError::new(
            format!("invalid port '{value}'"),
            Some("expected a UDP port between 1 and 65535".to_string()),
        )),
    }
}

fn config_error(err: SourceError) -> CliError {
    match err {
        SourceError::InvalidGroup { group } => CliError::new(
            format!("not a multicast group: {group}"),
            Some("use an address in 224.0.0.0/4, e.g. 239.0.0.1".to_string()),
        ),
        SourceError::InvalidPort { .. } => CliError::new(
            err.to_string(),
            Some("expected a UDP port between 1 and 65535".to_string()),
        ),
        other => CliError::new(other.to_string(), None),
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        n => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if n > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({n} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
