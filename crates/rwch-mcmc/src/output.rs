//! Plain-text data files: `#` header, one row per sample, `#` footer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rwch_core::{ErrorInfo, RwchError};
use rwch_walk::Diagnostics;

use crate::stats::Counters;

/// Column names of a sample row.
pub const ROW_COLUMNS: &str = "sweep L A r r2 max_diameter rx ry num_on_hull oblateness passage length visited_sites enclosed_sites";

/// Line-oriented writer; without a path every write is discarded.
#[derive(Debug)]
pub struct DataWriter {
    out: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl DataWriter {
    /// Opens (truncating) `path`, creating parent directories.
    pub fn create(path: Option<&Path>) -> Result<Self, RwchError> {
        let Some(path) = path else {
            return Ok(Self::discard());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_error("output-mkdir", err, parent))?;
        }
        let file = File::create(path).map_err(|err| io_error("output-create", err, path))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    /// A writer that drops everything.
    pub fn discard() -> Self {
        Self { out: None, path: None }
    }

    /// Target path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes `# text`.
    pub fn comment(&mut self, text: &str) -> Result<(), RwchError> {
        self.line(&format!("# {text}"))
    }

    /// Writes the title, the start time and the column line.
    pub fn header(&mut self, title: &str, columns: &str) -> Result<(), RwchError> {
        self.comment(title)?;
        self.comment(&format!("started {}", Utc::now().to_rfc3339()))?;
        self.comment(columns)
    }

    /// Writes one sample row and flushes.
    pub fn row(&mut self, sweep: usize, d: &Diagnostics) -> Result<(), RwchError> {
        self.line(&format!(
            "{sweep} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            d.l,
            d.a,
            d.r,
            d.r2,
            d.max_diameter,
            d.rx,
            d.ry,
            d.num_on_hull,
            d.oblateness,
            d.passage,
            d.length,
            d.visited_sites,
            d.enclosed_sites
        ))
    }

    /// Writes space-separated values with twelve significant digits.
    pub fn values(&mut self, values: &[f64]) -> Result<(), RwchError> {
        let text: Vec<String> = values.iter().map(|v| format!("{v:.12e}")).collect();
        self.line(&text.join(" "))
    }

    /// Writes the run statistics footer.
    pub fn footer(&mut self, counters: &Counters, sweeps: usize, elapsed: Duration) -> Result<(), RwchError> {
        let rejected = if counters.tries == 0 {
            0.0
        } else {
            100.0 * counters.rejections as f64 / counters.tries as f64
        };
        self.comment(&format!("proposed changes: {}", counters.tries))?;
        self.comment(&format!("rejected changes: {} ({rejected:.2}%)", counters.rejections))?;
        self.comment(&format!("acceptance: {:.6}", counters.acceptance()))?;
        self.comment(&format!(
            "time/sweep in seconds: {:.6e}",
            elapsed.as_secs_f64() / sweeps.max(1) as f64
        ))
    }

    fn line(&mut self, text: &str) -> Result<(), RwchError> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        let path = self.path.as_deref().unwrap_or_else(|| Path::new(""));
        writeln!(out, "{text}")
            .and_then(|_| out.flush())
            .map_err(|err| io_error("output-write", err, path))
    }
}

fn io_error(code: &str, err: std::io::Error, path: &Path) -> RwchError {
    RwchError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}
