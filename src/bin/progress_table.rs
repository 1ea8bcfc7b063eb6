//! progress-table: live progress table for a stream of profiling events.
//!
//! Reads tab-separated rows `scope_id name host value kind` from stdin or a
//! file. A blank line ends a batch, `RESET` restarts the table and lines
//! starting with `#` are ignored. The live table is drawn on stderr; the
//! final summary goes to stdout.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use progress_table::batch::EventRecord;
use progress_table::clock::Stopwatch;
use progress_table::config::Config;
use progress_table::logging;
use progress_table::render::LiveMode;
use progress_table::table::ProgressTable;
use progress_table::terminal::{CrosstermTerminal, FixedWidth, TerminalWidth};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Live progress table for streamed profiling events
#[derive(Parser, Debug)]
#[command(name = "progress-table")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Live progress table for streamed profiling events", long_about = None)]
struct Cli {
    /// Config file path (default: the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read events from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Fixed terminal width instead of querying the terminal
    #[arg(short, long)]
    width: Option<usize>,

    /// Start with the table hidden behind a one-line hint
    #[arg(long)]
    hidden: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// One line of the event stream.
#[derive(Debug, PartialEq)]
enum StreamLine {
    Record(EventRecord),
    EndOfBatch,
    Reset,
    Skip,
}

fn classify(text: &str, line: usize) -> progress_table::Result<StreamLine> {
    let trimmed = text.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return Ok(StreamLine::EndOfBatch);
    }
    if trimmed.starts_with('#') {
        return Ok(StreamLine::Skip);
    }
    if trimmed.trim() == "RESET" {
        return Ok(StreamLine::Reset);
    }
    EventRecord::parse_tsv(trimmed, line).map(StreamLine::Record)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default_path().map(Config::load_or_default).unwrap_or_default(),
    };
    if let Some(refresh) = cli.refresh {
        config.global.refresh_ms = refresh;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    debug!(?config, "configuration loaded");

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    match cli.width {
        Some(width) => run(&cli, &config, input, FixedWidth(width)),
        None => run(&cli, &config, input, CrosstermTerminal),
    }
}

fn run<T>(cli: &Cli, config: &Config, input: Box<dyn BufRead>, terminal: T) -> Result<()>
where
    T: TerminalWidth + Send + Sync + 'static,
{
    let table = Arc::new(ProgressTable::with_parts(
        Arc::new(config.catalog()),
        config.layout,
        terminal,
        Stopwatch::new(),
    ));

    let mode = if cli.hidden && config.global.toggle_enabled {
        LiveMode::Hidden
    } else {
        if cli.hidden {
            warn!("--hidden ignored: global.toggle_enabled is false");
        }
        LiveMode::Table
    };

    let (stop, stopped) = mpsc::channel::<()>();
    let ticker = {
        let table = Arc::clone(&table);
        let interval = config.refresh_interval();
        thread::spawn(move || tick(&table, mode, interval, &stopped))
    };

    let ingested = ingest_stream(&table, input);

    drop(stop);
    ticker.join().map_err(|_| anyhow!("render thread panicked"))?;

    let mut clear = Vec::new();
    table.clear_table_output(&mut clear)?;
    io::stderr().write_all(&clear)?;
    ingested?;

    let mut summary = Vec::new();
    table.write_final_table(&mut summary)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&summary)?;
    stdout.flush()?;
    Ok(())
}

/// Draws one live frame into memory.
///
/// The stderr lock must not be held while the table lock is taken: ingest
/// logs to stderr with the table locked.
fn render_frame<T: TerminalWidth>(
    table: &ProgressTable<T>,
    mode: LiveMode,
) -> progress_table::Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(4096);
    table.write_table(&mut frame, mode)?;
    Ok(frame)
}

fn tick<T: TerminalWidth>(
    table: &ProgressTable<T>,
    mode: LiveMode,
    interval: Duration,
    stopped: &mpsc::Receiver<()>,
) {
    loop {
        match stopped.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
        let written = render_frame(table, mode)
            .and_then(|frame| io::stderr().write_all(&frame).map_err(Into::into));
        if let Err(e) = written {
            warn!(error = %e, "live render failed");
            return;
        }
    }
}

fn ingest_stream<T: TerminalWidth>(table: &ProgressTable<T>, input: Box<dyn BufRead>) -> Result<()> {
    let mut batch = Vec::new();
    let mut batches = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let text = line.with_context(|| format!("reading input line {line_number}"))?;

        match classify(&text, line_number) {
            Ok(StreamLine::Record(record)) => batch.push(record),
            Ok(StreamLine::EndOfBatch) => {
                flush(table, &mut batch);
                batches += 1;
            }
            Ok(StreamLine::Reset) => {
                flush(table, &mut batch);
                table.reset_table();
                info!(line = line_number, "table reset");
            }
            Ok(StreamLine::Skip) => {}
            Err(e) => warn!(error = %e, "skipping input line"),
        }
    }
    flush(table, &mut batch);
    debug!(batches, "input exhausted");
    Ok(())
}

fn flush<T: TerminalWidth>(table: &ProgressTable<T>, batch: &mut Vec<EventRecord>) {
    if batch.is_empty() {
        return;
    }
    table.update_progress(batch);
    batch.clear();
}
