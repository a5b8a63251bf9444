//! Log Reader
//!
//! Sequential scan over a log file's records.
//!
//! The reader is strict: any undecodable line is an error. Torn-tail
//! tolerance lives in recovery, which truncates before normal operation; a
//! reader opened on a recovered file therefore sees only valid records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LoamError, Result};

use super::record::DecodeError;
use super::Record;

/// Reads records from the log file in order
pub struct LogReader {
    reader: BufReader<File>,
    line_no: usize,
}

impl LogReader {
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(LogReader {
            reader: BufReader::new(file),
            line_no: 0,
        })
    }

    /// Read the next record, or `None` at end of file.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if !line.ends_with('\n') {
            return Err(LoamError::Corruption {
                line: self.line_no,
                reason: "unterminated line".to_string(),
            });
        }
        let line = line.trim_end_matches('\n');

        match Record::decode(line) {
            Ok(record) => Ok(Some(record)),
            Err(DecodeError::UnknownTag(tag)) => Err(LoamError::UnknownRecord {
                line: self.line_no,
                tag,
            }),
            Err(DecodeError::Malformed(reason)) => Err(LoamError::Corruption {
                line: self.line_no,
                reason: reason.to_string(),
            }),
        }
    }

    /// Iterate over all records
    pub fn records(self) -> RecordIter {
        RecordIter {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over log records; fuses after the first error or end of file
pub struct RecordIter {
    reader: LogReader,
    done: bool,
}

impl Iterator for RecordIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
