use crate::config::LogLevel;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Route `tracing` output to `path` (appending). The terminal owns stdout
/// while the app runs, so without a file nothing is logged.
pub fn init_file(path: Option<&Path>, level: LogLevel) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(Level::from(level))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}

/// Log to stderr, for headless tools.
pub fn init_stderr(level: LogLevel) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::from(level))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}
