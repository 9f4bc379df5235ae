//! Rolling Logger
//!
//! Size-rotated log file plus an in-memory ring of the most recent lines.
//! `log` records are bridged into the tracing subscriber installed by
//! [`init_logger`], so callers can keep using the `log` macros.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Rotate once the active file would grow past this size
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Active file plus rotated backups
pub const DEFAULT_MAX_FILES: usize = 5;
/// Lines kept in memory for in-app log views
pub const DEFAULT_RECENT_CAPACITY: usize = 200;

static LOGGER: OnceLock<LogWriter> = OnceLock::new();

// ========================
// Rolling File
// ========================

/// Log file that rotates `<name>.log` -> `<name>.log.1` -> ... when full
pub struct RollingFile {
    dir: PathBuf,
    base_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, base_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", base_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
            max_bytes,
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    /// Path of the active file, or of backup `index` (1 = newest backup)
    pub fn path(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.dir.join(format!("{}.log", self.base_name))
        } else {
            self.dir.join(format!("{}.log.{}", self.base_name, index))
        }
    }

    pub fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        // Oldest backup falls off the end
        let oldest = self.path(self.max_files - 1);
        if self.max_files > 1 && oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files.saturating_sub(1)).rev() {
            let from = self.path(index);
            if from.exists() {
                fs::rename(&from, self.path(index + 1))?;
            }
        }
        if self.max_files > 1 {
            fs::rename(self.path(0), self.path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.path(0))?;
        self.written = 0;
        Ok(())
    }
}

// ========================
// Writer
// ========================

struct Shared {
    file: Mutex<RollingFile>,
    recent: Mutex<VecDeque<String>>,
    capacity: usize,
}

/// Cloneable writer handed to the tracing subscriber
#[derive(Clone)]
pub struct LogWriter {
    shared: Arc<Shared>,
}

impl LogWriter {
    pub fn new(file: RollingFile, capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                file: Mutex::new(file),
                recent: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    /// Most recent lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.shared.recent.lock() {
            Ok(recent) => recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn remember(&self, buf: &[u8]) {
        if self.shared.capacity == 0 {
            return;
        }
        let text = String::from_utf8_lossy(buf);
        let Ok(mut recent) = self.shared.recent.lock() else {
            return;
        };
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if recent.len() == self.shared.capacity {
                recent.pop_front();
            }
            recent.push_back(line.to_string());
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        {
            let mut file = self
                .shared
                .file
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            file.write_bytes(buf)?;
        }
        self.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .shared
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.file.flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Local wall-clock timestamps, millisecond precision
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ========================
// Global Setup
// ========================

/// Install the global subscriber writing to `<log_dir>/<app_name>.log`
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Err("logger already initialized".to_string());
    }

    let file = RollingFile::open(&log_dir, app_name, DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    let writer = LogWriter::new(file, DEFAULT_RECENT_CAPACITY);

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    LOGGER
        .set(writer)
        .map_err(|_| "logger already initialized".to_string())?;

    log::info!("{} logging to {}", app_name, log_dir.display());
    Ok(())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!("{}", msg);
    Ok(())
}

/// Recent lines from the global logger (empty before init)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(LogWriter::recent).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("logger not initialized".to_string());
    }
    Ok(())
}
