//! Barforge replay - aggregates recorded ticks into bars
//!
//! Reads a tick CSV, feeds it through the strategy engine and writes the
//! completed bars (window bars when a window is configured, 1-minute bars
//! otherwise) as CSV or JSON lines.
//!
//! # Usage
//! ```sh
//! cargo run --bin replay -- --ticks data/rb2105.csv --window 5 --output bars.csv
//! ```
//!
//! # Environment Variables
//! - `BARFORGE_SYMBOLS` - Instruments to replay (default: every vt_symbol in the file)
//! - `BARFORGE_WINDOW` / `BARFORGE_WINDOW_INTERVAL` - Window bar size (default: none)
//! - `BARFORGE_BUFFER_SIZE` - Rolling history length (default: 100)
//! - `BARFORGE_SESSION_FILTER` - Drop ticks outside trading sessions (default: false)
//! - `BARFORGE_LOG_DIR` / `BARFORGE_LOG_LEVEL` - Log file directory and level

use anyhow::{Context, Result};
use barforge::application::engine::StrategyEngine;
use barforge::application::market_data::indicators;
use barforge::application::market_data::pipeline::PipelineEvent;
use barforge::config::Config;
use barforge::domain::market::bar::Bar;
use barforge::domain::market::interval::Interval;
use barforge::domain::market::rolling_buffer::RollingBuffer;
use barforge::domain::ports::Strategy;
use barforge::infrastructure::csv_feed::{BarCsvWriter, read_ticks_from_path, write_json_line};
use barforge::infrastructure::{BarRecorder, FileLogger, LoggerRegistry, init_tracing};
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tick CSV to replay
    #[arg(long)]
    ticks: PathBuf,

    /// TOML config file (environment variables are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination for completed bars (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Window size override; 0 disables window bars
    #[arg(long)]
    window: Option<u32>,

    /// Window unit override (1m or 1h)
    #[arg(long)]
    interval: Option<String>,

    #[arg(long)]
    buffer_size: Option<usize>,

    /// Also record every 1-minute bar to this CSV file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Period of the moving average logged by the replay strategy
    #[arg(long, default_value_t = 20)]
    sma_period: usize,
}

/// Logs every bar it sees, plus a moving average once history is full
struct BarLogger {
    name: String,
    sma_period: usize,
    file: Option<FileLogger>,
}

impl Strategy for BarLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_bar(&mut self, bar: &Bar, history: &RollingBuffer) {
        let sma = indicators::sma(history, self.sma_period).ok();
        debug!(
            "{}: {} {} C:{} V:{} SMA({}): {:?}",
            self.name,
            bar.vt_symbol(),
            bar.datetime,
            bar.close,
            bar.volume,
            self.sma_period,
            sma
        );

        if let Some(file) = &self.file {
            let line = format!(
                "{} {} O:{} H:{} L:{} C:{} V:{}",
                bar.vt_symbol(),
                bar.datetime,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            );
            if let Err(e) = file.log(&line) {
                warn!("{}: failed to write log file: {}", self.name, e);
            }
        }
    }
}

enum BarSink {
    Csv(BarCsvWriter<Box<dyn Write>>),
    Json(BufWriter<Box<dyn Write>>),
}

impl BarSink {
    fn open(output: Option<&PathBuf>, format: OutputFormat) -> Result<Self> {
        let sink: Box<dyn Write> = match output {
            Some(path) => Box::new(
                File::create(path)
                    .context(format!("Failed to create output {}", path.display()))?,
            ),
            None => Box::new(io::stdout()),
        };
        Ok(match format {
            OutputFormat::Csv => BarSink::Csv(BarCsvWriter::new(sink)),
            OutputFormat::Json => BarSink::Json(BufWriter::new(sink)),
        })
    }

    fn write(&mut self, bar: &Bar) -> Result<()> {
        match self {
            BarSink::Csv(writer) => writer.write(bar),
            BarSink::Json(writer) => write_json_line(writer, bar),
        }
    }

    fn finish(self) -> Result<()> {
        match self {
            BarSink::Csv(mut writer) => writer.flush(),
            BarSink::Json(mut writer) => writer.flush().context("Failed to flush JSON output"),
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Some(window) = args.window {
        config.window = window;
    }
    if let Some(interval) = &args.interval {
        config.window_interval = Interval::from_str(interval)?;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.buffer_size = buffer_size;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args)?;

    let registry = config.log_dir.clone().map(LoggerRegistry::new);
    let replay_log = match &registry {
        Some(registry) => Some(registry.logger("replay.log")?),
        None => None,
    };
    init_tracing(&config.log_level, replay_log)?;

    info!("Barforge replay {} starting...", env!("CARGO_PKG_VERSION"));

    let ticks = read_ticks_from_path(&args.ticks)?;
    info!("Loaded {} tick(s) from {}", ticks.len(), args.ticks.display());

    let symbols: BTreeSet<String> = if config.symbols.is_empty() {
        ticks.iter().map(|t| t.vt_symbol()).collect()
    } else {
        config.symbols.iter().cloned().collect()
    };

    let pipeline_config = config.pipeline_config()?;
    let windowed = pipeline_config.window.is_some();

    let mut engine = StrategyEngine::new(pipeline_config);
    let recorder = match &args.record {
        Some(path) => {
            let file = File::create(path)
                .context(format!("Failed to create record file {}", path.display()))?;
            let (recorder, tx) = BarRecorder::spawn(file);
            engine = engine.with_recorder(tx);
            Some(recorder)
        }
        None => None,
    };

    for vt_symbol in &symbols {
        let file = match &registry {
            Some(registry) => Some(registry.logger(&format!("{}.log", vt_symbol))?),
            None => None,
        };
        let strategy = BarLogger {
            name: format!("BarLogger[{}]", vt_symbol),
            sma_period: args.sma_period.min(config.buffer_size),
            file,
        };
        engine.add_strategy(vt_symbol, Box::new(strategy))?;
    }

    let mut sink = BarSink::open(args.output.as_ref(), args.format)?;
    let mut written = 0usize;
    let mut write_events = |events: Vec<PipelineEvent>, sink: &mut BarSink| -> Result<()> {
        for event in events {
            let final_stage = matches!(
                (&event, windowed),
                (PipelineEvent::Window(_), true) | (PipelineEvent::Minute(_), false)
            );
            if final_stage {
                sink.write(event.bar())?;
                written += 1;
            }
        }
        Ok(())
    };

    for tick in &ticks {
        write_events(engine.on_tick(tick), &mut sink)?;
    }
    write_events(engine.stop(), &mut sink)?;
    sink.finish()?;

    // Dropping the engine closes the recorder channel
    drop(engine);
    if let Some(recorder) = recorder {
        let recorded = recorder.join()?;
        info!("Recorded {} 1-minute bar(s)", recorded);
    }

    info!(
        "Replay finished: {} tick(s), {} instrument(s), {} bar(s) written",
        ticks.len(),
        symbols.len(),
        written
    );
    Ok(())
}
