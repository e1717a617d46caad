//! lttview - Live Terminal Event Viewer
//!
//! Reads structured trace events from stdin, a file or a child process and shows them as a
//! live, filterable list.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use lttview::render::ui::{ColorTheme, TerminalUI};
use lttview::{Application, MatchPolicy, RecordFraming, SourceSpec, ViewerConfig};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;

const LOG_ENV: &str = "LTTVIEW_LOG";
/// Blocking tasks still stuck in a read after quit are abandoned after this long.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn cli() -> Command {
    let command = Command::new("lttview")
        .version(lttview::VERSION)
        .about("A live terminal viewer for structured trace event streams")
        .long_about(
            "lttview shows trace events as a scrollable list that keeps growing while the \
             producer runs. Each record is a JSON object with a `name` member; the event \
             name becomes the title and the payload the description. Type `/` to filter.",
        )
        .arg(
            Arg::new("source")
                .help("File or FIFO to read events from, or `-` for stdin")
                .default_value("-")
                .index(1)
                .conflicts_with("exec"),
        )
        .arg(
            Arg::new("exec")
                .long("exec")
                .short('e')
                .help("Run a command and read events from its standard output")
                .value_name("CMD")
                .num_args(1..)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("framing")
                .long("framing")
                .help("How records are delimited: `lines` or `json`")
                .value_name("FRAMING"),
        )
        .arg(
            Arg::new("match")
                .long("match")
                .help("Filter matching: `fuzzy` or `substring`")
                .value_name("POLICY"),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .help("Milliseconds between polls of the source")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("no-description")
                .long("no-description")
                .help("Show only event names, one line per event")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write diagnostics to this file (also read from LTTVIEW_LOG)")
                .value_name("PATH")
                .env(LOG_ENV),
        );

    #[cfg(feature = "config")]
    let command = command.arg(
        Arg::new("config")
            .long("config")
            .help("Path to a TOML configuration file")
            .value_name("PATH"),
    );

    command
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    if let Err(err) = init_logging(&matches) {
        eprintln!("lttview: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("lttview: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logging goes to a file because the frame owns stdout; without one it stays off.
fn init_logging(matches: &ArgMatches) -> Result<()> {
    let Some(path) = matches.get_one::<String>("log-file") else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let spec = source_spec(matches);

    // Opened before raw mode so a missing file or command is reported on a sane terminal.
    let source = spec
        .open(config.framing)
        .with_context(|| format!("cannot read events from {}", spec.describe()))?;

    let runtime = Runtime::new().context("cannot start async runtime")?;
    let ui_renderer = Box::new(TerminalUI::with_theme(ColorTheme::from_env())?);
    let mut app = Application::new(config, source, spec.describe(), ui_renderer);
    block_then_shutdown(runtime, app.run())?;
    Ok(())
}

/// Run `future` to completion, then stop the runtime without waiting indefinitely on
/// blocking tasks (a source read that never returns must not keep the process alive).
fn block_then_shutdown<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    output
}

fn source_spec(matches: &ArgMatches) -> SourceSpec {
    if let Some(mut words) = matches.get_many::<String>("exec") {
        if let Some(program) = words.next() {
            return SourceSpec::Command {
                program: program.clone(),
                args: words.cloned().collect(),
            };
        }
    }
    match matches.get_one::<String>("source").map(String::as_str) {
        None | Some("-") => SourceSpec::Stdin,
        Some(path) => SourceSpec::File(PathBuf::from(path)),
    }
}

fn resolve_config(matches: &ArgMatches) -> Result<ViewerConfig> {
    let mut config = base_config(matches)?;

    if let Some(framing) = matches.get_one::<String>("framing") {
        config.framing = framing
            .parse::<RecordFraming>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(policy) = matches.get_one::<String>("match") {
        config.match_policy = policy
            .parse::<MatchPolicy>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(tick) = matches.get_one::<u64>("tick-ms") {
        config.tick_interval_ms = *tick;
    }
    if matches.get_flag("no-description") {
        config.show_description = false;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(feature = "config")]
fn base_config(matches: &ArgMatches) -> Result<ViewerConfig> {
    if let Some(path) = matches.get_one::<String>("config") {
        return Ok(ViewerConfig::load(std::path::Path::new(path))?);
    }
    match ViewerConfig::default_path() {
        Some(path) if path.is_file() => Ok(ViewerConfig::load(&path)?),
        _ => Ok(ViewerConfig::default()),
    }
}

#[cfg(not(feature = "config"))]
fn base_config(_matches: &ArgMatches) -> Result<ViewerConfig> {
    Ok(ViewerConfig::default())
}
