//! ktselect CLI binary entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ktselect::cli::{list_files, write_list_text};
use ktselect::error::SelectError;
use ktselect::output::{emit_response, ArchivesResponse, ErrorResponse};
use ktselect::paths::{home_dir, resolve_archives};
use ktselect::scan::{PathRendering, ScanOptions};

/// Ordered include/exclude file selection for Kotlin lint and format runs.
#[derive(Parser)]
#[command(name = "ktselect")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Root directory to scan (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Emit JSON responses instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the files the patterns select.
    ///
    /// Patterns are globs (`src/**/*.kt`), `!`-prefixed exclusions, or
    /// `regex:`-prefixed regular expressions, applied in order. Without
    /// patterns, `**/*.kt` and `**/*.kts` are used.
    List {
        /// Include/exclude patterns, in order
        #[arg(allow_hyphen_values = true)]
        patterns: Vec<String>,

        /// Print paths relative to the root
        #[arg(long)]
        relative: bool,

        /// Visit directory entries in name order
        #[arg(long)]
        sorted: bool,

        /// Show the pattern that selected each file
        #[arg(long)]
        explain: bool,
    },

    /// Check rule-module archives and print their locators.
    Archives {
        /// Archive paths (`~` is expanded)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level, cli.global.log_json);

    let json = cli.global.json;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                let _ = emit_response(&ErrorResponse::new(&err), &mut io::stdout());
                let _ = io::stdout().flush();
            } else {
                eprintln!("error: {}", err);
            }
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), SelectError> {
    let home = home_dir();
    match cli.command {
        Command::List {
            patterns,
            relative,
            sorted,
            explain,
        } => {
            let root = resolve_root(cli.global.root)?;
            let rendering = if relative {
                PathRendering::Relative
            } else {
                PathRendering::Absolute
            };
            let response = list_files(
                &root,
                &patterns,
                home.as_deref(),
                rendering,
                ScanOptions { sorted },
                explain,
            )?;
            if cli.global.json {
                emit_response(&response, &mut io::stdout())?;
            } else {
                write_list_text(&response, &mut io::stdout().lock(), &mut io::stderr())?;
            }
        }
        Command::Archives { paths } => {
            let archives = resolve_archives(&paths, home.as_deref())?;
            if cli.global.json {
                emit_response(&ArchivesResponse::new(archives), &mut io::stdout())?;
            } else {
                let mut out = io::stdout().lock();
                for archive in &archives {
                    writeln!(out, "{}", archive.url)?;
                }
            }
        }
    }
    let _ = io::stdout().flush();
    Ok(())
}

/// The root is fixed once per invocation: `--root`, else the working directory.
fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, SelectError> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir()
            .map_err(|e| SelectError::root_unavailable(PathBuf::from("."), e)),
    }
}
