//! Append-only binary log of walk configurations.
//!
//! Each record is an 8-byte little-endian payload length followed by the
//! bincode encoding of `(steps, dimension, latent)`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use rwch_core::{ErrorInfo, RwchError};
use serde::{Deserialize, Serialize};

use crate::kind::WalkKind;
use crate::walk::Walk;

/// One saved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    /// Number of steps of the walk.
    pub steps: u64,
    /// Spatial dimension.
    pub dimension: u64,
    /// Latent numbers.
    pub latent: Vec<f64>,
}

fn io_error(code: &str, err: std::io::Error, path: &Path) -> RwchError {
    RwchError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Every record in the log at `path`, oldest first.
pub fn read_configurations(path: &Path) -> Result<Vec<ConfigurationRecord>, RwchError> {
    let bytes = fs::read(path).map_err(|err| io_error("configuration-read", err, path))?;
    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let header: [u8; 8] = bytes
            .get(offset..offset + 8)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| truncated(path, offset))?;
        offset += 8;
        let len = usize::try_from(u64::from_le_bytes(header)).map_err(|_| truncated(path, offset))?;
        let payload = offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
            .ok_or_else(|| truncated(path, offset))?;
        let record: ConfigurationRecord = bincode::deserialize(payload).map_err(|err| {
            RwchError::Serde(
                ErrorInfo::new("configuration-decode", err.to_string())
                    .with_context("path", path.display().to_string())
                    .with_context("offset", offset.to_string()),
            )
        })?;
        records.push(record);
        offset += len;
    }
    Ok(records)
}

fn truncated(path: &Path, offset: usize) -> RwchError {
    RwchError::Serde(
        ErrorInfo::new("configuration-truncated", "configuration log ends inside a record")
            .with_context("path", path.display().to_string())
            .with_context("offset", offset.to_string()),
    )
}

impl Walk {
    /// Appends the current configuration to the log at `path`.
    pub fn save_configuration(&self, path: &Path) -> Result<(), RwchError> {
        let record = ConfigurationRecord {
            steps: self.params.steps as u64,
            dimension: self.params.dimension as u64,
            latent: self.latent.clone(),
        };
        let payload = bincode::serialize(&record).map_err(|err| {
            RwchError::Serde(
                ErrorInfo::new("configuration-encode", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_error("configuration-mkdir", err, parent))?;
        }
        let mut file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| io_error("configuration-open", err, path))?;
        file.write_all(&(payload.len() as u64).to_le_bytes())
            .and_then(|_| file.write_all(&payload))
            .map_err(|err| io_error("configuration-write", err, path))
    }

    /// Restores the last configuration in the log at `path`.
    ///
    /// The record must match this walk's step count and dimension.
    pub fn load_configuration(&mut self, path: &Path) -> Result<(), RwchError> {
        let record = read_configurations(path)?.pop().ok_or_else(|| {
            RwchError::Serde(
                ErrorInfo::new("configuration-empty", "configuration log holds no record")
                    .with_context("path", path.display().to_string()),
            )
        })?;

        let (kind, d, n) = (self.params.kind, self.params.dimension, self.params.steps);
        let expected_len = n * kind.arity(d);
        let len_ok = if kind == WalkKind::LoopErased {
            !record.latent.is_empty()
        } else {
            record.latent.len() == expected_len
        };
        if record.steps != n as u64 || record.dimension != d as u64 || !len_ok {
            return Err(RwchError::Serde(
                ErrorInfo::new("configuration-mismatch", "stored configuration does not fit this walk")
                    .with_context("path", path.display().to_string())
                    .with_context("stored", format!("steps={} d={} latent={}", record.steps, record.dimension, record.latent.len()))
                    .with_context("expected", format!("steps={n} d={d} latent={expected_len}")),
            ));
        }
        self.set_latent(record.latent);
        Ok(())
    }
}
