//! Log Writer
//!
//! Handles appending records to the log file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::Record;

/// Appends records to the log file.
///
/// Every append is forced to durable storage before it returns; a batch is
/// forced exactly once after its last record. This ordering is what lets the
/// engine update in-memory state only after durability is guaranteed.
#[derive(Debug)]
pub struct LogWriter {
    /// Buffered file handle; flushed and fsynced on every append
    file: BufWriter<File>,

    /// Path the writer was opened with
    path: PathBuf,

    /// Count of records appended through this writer
    appended: u64,
}

impl LogWriter {
    /// Open the log for appending, creating it if it does not exist.
    ///
    /// Recovery must already have truncated any torn tail before this is
    /// called, since append mode writes after whatever is present.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(LogWriter {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
            appended: 0,
        })
    }

    /// Append a single record and force it to durable storage.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let line = record.encode()?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.sync()?;
        self.appended += 1;
        Ok(())
    }

    /// Append a batch of records contiguously, forcing once at the end.
    ///
    /// If the process dies mid-batch, recovery truncates the partial tail, so
    /// the batch is all-or-nothing across a crash. An empty batch is a no-op.
    pub fn append_batch(&mut self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Encode everything up front so a framing error writes nothing.
        let mut buf = String::new();
        for record in records {
            buf.push_str(&record.encode()?);
            buf.push('\n');
        }

        self.file.write_all(buf.as_bytes())?;
        self.sync()?;
        self.appended += records.len() as u64;
        Ok(())
    }

    /// Force buffered data to disk (flush + fsync).
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        Ok(())
    }

    /// Count of records appended through this writer (excludes replayed ones)
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
