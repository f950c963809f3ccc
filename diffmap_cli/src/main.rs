use clap::error::ErrorKind;
use clap::Parser;
use diffmap_common::{ComparisonResult, MapConfig, DEFAULT_BLOCK_SIZE, DEFAULT_SCREEN_WIDTH};
use diffmap_core::TreeWalker;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, Event, Level, Subscriber};
use tracing_subscriber::fmt::{format, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Highest status a process can portably report
const MAX_EXIT_CODE: u64 = 255;

#[derive(Parser)]
#[command(name = "diffmap")]
#[command(author = "DiffMap Contributors")]
#[command(version)]
#[command(about = "Draw a block-by-block difference map of two files or directory trees", long_about = None)]
struct Cli {
    /// Reference file or directory
    left: PathBuf,

    /// File or directory compared against the reference
    right: PathBuf,

    /// Block size in bytes
    #[arg(short = 'b', long = "block-size", value_name = "BYTES",
          default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
    block_size: usize,

    /// Glyphs per output line (0 disables wrapping)
    #[arg(short = 'w', long = "width", value_name = "COLUMNS",
          default_value_t = DEFAULT_SCREEN_WIDTH, value_parser = parse_number)]
    width: usize,

    /// Visit directory entries in sorted order
    #[arg(short, long)]
    sort: bool,

    /// Print the final tally as JSON after the map
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonSummary {
    block_count: u64,
    identical_block_count: u64,
    dissimilarity: u64,
}

impl From<ComparisonResult> for JsonSummary {
    fn from(result: ComparisonResult) -> Self {
        Self {
            block_count: result.block_count,
            identical_block_count: result.identical_block_count,
            dissimilarity: result.dissimilarity(),
        }
    }
}

/// Formats every event as `<program>: <message>`
struct PrefixedFormat {
    program: String,
}

impl<S, N> FormatEvent<S, N> for PrefixedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{}: ", self.program)?;

        let level = *event.metadata().level();
        if level != Level::WARN && level != Level::ERROR {
            write!(writer, "{}: ", level)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn main() {
    // Diagnostics go to stderr so stdout carries only the map
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .event_format(PrefixedFormat {
            program: program_name(),
        })
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                error!("{}", e.to_string().trim_end());
                std::process::exit(e.exit_code());
            }
        },
    };

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = MapConfig::default()
        .with_block_size(cli.block_size)
        .with_screen_width(cli.width)
        .with_sorted_entries(cli.sort);
    debug!("Comparing {} with {}", cli.left.display(), cli.right.display());

    let mut walker = TreeWalker::new(config, io::stdout().lock())?;
    let result = walker.compare(&cli.left, &cli.right)?;

    let mut out = walker.into_inner();
    if cli.json {
        serde_json::to_writer(&mut out, &JsonSummary::from(result))?;
        writeln!(out)?;
    }
    out.flush()?;

    debug!(
        "{} blocks, {} identical",
        result.block_count, result.identical_block_count
    );
    Ok(exit_code(&result))
}

/// Dissimilarity as a process status, saturated so it never wraps to 0
fn exit_code(result: &ComparisonResult) -> i32 {
    result.dissimilarity().min(MAX_EXIT_CODE) as i32
}

fn parse_number(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("\"{}\" is not a valid number", value))
}

fn parse_block_size(value: &str) -> Result<usize, String> {
    match parse_number(value)? {
        0 => Err("block size must be at least one byte".to_string()),
        size => Ok(size),
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diffmap".to_string())
}
