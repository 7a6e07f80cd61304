//! Tracing setup and per-name file loggers.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber: stdout, plus `file` when given.
///
/// `level` is an `EnvFilter` directive such as `info` or `barforge=debug`;
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(level: &str, file: Option<FileLogger>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context(format!("Invalid log level: {}", level))?;

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = file.map(|logger| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(logger)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Tracing subscriber already installed")
}

/// Shared append-only handle to one log file.
///
/// Clones write to the same file.
#[derive(Clone)]
pub struct FileLogger {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl FileLogger {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Appends `[YYYY-MM-DD HH:MM:SS] message`
    pub fn log(&self, message: &str) -> io::Result<()> {
        let line = format!("[{}] {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        self.writer().write_all(line.as_bytes())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shares_file_with(&self, other: &FileLogger) -> bool {
        Arc::ptr_eq(&self.file, &other.file)
    }

    fn writer(&self) -> FileLoggerWriter {
        FileLoggerWriter {
            file: Arc::clone(&self.file),
        }
    }
}

pub struct FileLoggerWriter {
    file: Arc<Mutex<File>>,
}

impl Write for FileLoggerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for FileLogger {
    type Writer = FileLoggerWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// Hands out one [`FileLogger`] per file name under a log directory.
///
/// Create once at startup and pass it to whatever needs a file sink.
pub struct LoggerRegistry {
    dir: PathBuf,
    loggers: Mutex<HashMap<String, FileLogger>>,
}

impl LoggerRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the logger for `file_name`, opening the file on first use
    pub fn logger(&self, file_name: &str) -> io::Result<FileLogger> {
        let mut loggers = self
            .loggers
            .lock()
            .map_err(|_| io::Error::other("logger registry lock poisoned"))?;

        if let Some(logger) = loggers.get(file_name) {
            return Ok(logger.clone());
        }

        fs::create_dir_all(&self.dir)?;
        let logger = FileLogger::open(self.dir.join(file_name))?;
        loggers.insert(file_name.to_string(), logger.clone());
        Ok(logger)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
