//! Execution log and timing helpers
//!
//! Every processed image leaves one fixed-width row in a plain text log:
//!
//! ```text
//! DATE                          FILE                                     STATUS      MESSAGE
//! 2026-10-16 09:12:44           specimen_01.png                          1           12 regions
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ExecutionLogConfig;

/// Width of the date column
const DATE_WIDTH: usize = 30;

/// Destination for per-component success/failure records
pub trait ExecutionSink: Send + Sync {
    fn record(&self, component: &str, success: bool, message: Option<&str>) -> std::io::Result<()>;
}

/// Pad `value` with spaces, or cut it, to exactly `width` characters
fn fit(value: &str, width: usize) -> String {
    let mut fitted: String = value.chars().take(width).collect();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat_n(' ', width - len));
    fitted
}

/// Appends records to a text file, writing the header on first use
pub struct FileExecutionLog {
    path: PathBuf,
    name_width: usize,
    /// Serializes appends from concurrent workers
    lock: Mutex<()>,
}

impl FileExecutionLog {
    pub fn new(config: &ExecutionLogConfig) -> Self {
        Self {
            path: config.path.clone(),
            name_width: config.name_width,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn header(&self) -> String {
        format!(
            "DATE{}FILE{}STATUS      MESSAGE",
            " ".repeat(DATE_WIDTH - 4),
            " ".repeat(self.name_width.saturating_sub(3))
        )
    }

    fn row(&self, date: &str, component: &str, success: bool, message: Option<&str>) -> String {
        format!(
            "{}{} {}           {}",
            fit(date, DATE_WIDTH),
            fit(component, self.name_width),
            u8::from(success),
            message.unwrap_or("")
        )
    }
}

impl ExecutionSink for FileExecutionLog {
    fn record(&self, component: &str, success: bool, message: Option<&str>) -> std::io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", self.header())?;
        }

        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        writeln!(file, "{}", self.row(&date, component, success, message))?;
        Ok(())
    }
}

/// One record kept by [`MemoryExecutionLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub component: String,
    pub success: bool,
    pub message: Option<String>,
}

/// Keeps records in memory; used where no log file is wanted
#[derive(Debug, Default)]
pub struct MemoryExecutionLog {
    records: Mutex<Vec<ExecutionRecord>>,
}

impl MemoryExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ExecutionSink for MemoryExecutionLog {
    fn record(&self, component: &str, success: bool, message: Option<&str>) -> std::io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ExecutionRecord {
                component: component.to_string(),
                success,
                message: message.map(str::to_string),
            });
        Ok(())
    }
}

/// Run `f` and return its result with the elapsed wall-clock time
pub fn measure_execution_time<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    debug!("Execution time: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    (result, elapsed)
}
