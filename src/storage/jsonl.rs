//! Append-only JSONL log with tolerant reads.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// One JSON object per line, appended and never rewritten in place.
///
/// Each record is serialized up front and written with a single `write_all`
/// on an append-mode handle, so a reader never sees half of a record from a
/// well-behaved writer.
#[derive(Debug)]
pub struct JsonlLog<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonlLog<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> JsonlLog<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty the log. A missing log stays missing.
    pub fn truncate(&self) -> Result<()> {
        if self.path.exists() {
            File::create(&self.path)?;
        }
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned> JsonlLog<T> {
    /// Append a record, creating the file and its parent directory if needed.
    pub fn append(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Read every record in order.
    ///
    /// A missing file is an empty log. Lines that are not UTF-8 or do not
    /// deserialize are skipped with a warning; only failing to read the file
    /// itself is an error.
    pub fn read_all(&self) -> Result<Vec<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping non-UTF-8 record at {}:{}: {}", self.path.display(), index + 1, e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping malformed record at {}:{}: {}",
                    self.path.display(),
                    index + 1,
                    e
                ),
            }
        }
        Ok(records)
    }

    /// True when the file exists and holds any bytes, parseable or not
    pub fn has_content(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
