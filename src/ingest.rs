//! Weather-record ingestion
//!
//! Input is line-oriented text, one record per line:
//!
//! ```text
//! <location> <year> <month> <day> <time> <temperature>
//! ```
//!
//! Only the temperature is kept, scaled to a [`Sample`]. Lines that cannot be
//! used are reported and skipped rather than aborting the load.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::sample::{Sample, to_sample};

/// Whitespace-separated fields in a complete record.
pub const RECORD_FIELDS: usize = 6;

/// Samples between progress events.
const PROGRESS_INTERVAL: usize = 1000;

/// Why a line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Fewer than [`RECORD_FIELDS`] fields
    Truncated {
        /// Fields actually present
        fields: usize,
    },
    /// The temperature field is not a decimal number
    Malformed(String),
    /// The temperature is not finite or does not fit a sample
    OutOfRange(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { fields } => {
                write!(f, "truncated record ({fields} of {RECORD_FIELDS} fields)")
            }
            Self::Malformed(text) => write!(f, "malformed temperature '{text}'"),
            Self::OutOfRange(text) => write!(f, "temperature '{text}' out of range"),
        }
    }
}

/// A skipped input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// 1-based line number
    pub line: usize,
    /// What was wrong with it
    pub reason: RejectReason,
}

/// Result of loading a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingested {
    /// Scaled temperatures, in input order
    pub samples: Vec<Sample>,
    /// Lines that were skipped
    pub rejected: Vec<Rejected>,
}

fn parse_line(line: &str) -> std::result::Result<Option<Sample>, RejectReason> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < RECORD_FIELDS {
        return Err(RejectReason::Truncated {
            fields: fields.len(),
        });
    }

    let text = fields[fields.len() - 1];
    let value: f64 = text
        .parse()
        .map_err(|_| RejectReason::Malformed(text.to_string()))?;
    to_sample(value)
        .map(Some)
        .ok_or_else(|| RejectReason::OutOfRange(text.to_string()))
}

/// Parse records from `reader`.
///
/// # Errors
///
/// - `Io` if reading fails part-way; the path is reported as `<input>`
pub fn parse_records(reader: impl BufRead) -> Result<Ingested> {
    let mut ingested = Ingested::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| Error::io("<input>", e))?;

        match parse_line(&line) {
            Ok(Some(sample)) => {
                ingested.samples.push(sample);
                if ingested.samples.len() % PROGRESS_INTERVAL == 0 {
                    tracing::debug!(samples = ingested.samples.len(), "ingest progress");
                }
            }
            Ok(None) => {}
            Err(reason) => {
                tracing::warn!(line = line_no, %reason, "skipping record");
                ingested.rejected.push(Rejected {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        samples = ingested.samples.len(),
        rejected = ingested.rejected.len(),
        "ingest complete"
    );
    Ok(ingested)
}

/// Load records from the file at `path`.
///
/// # Errors
///
/// - `Io` if the file cannot be opened or read
pub fn read_path(path: impl AsRef<Path>) -> Result<Ingested> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), "reading dataset");
    parse_records(BufReader::new(file)).map_err(|e| match e {
        Error::Io { source, .. } => Error::io(path, source),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_keeps_last_field() {
        let input = "ARMAGH 2006 1 1 0 6.17\nARMAGH 2006 1 1 100 -2.46\n";
        let ingested = parse_records(input.as_bytes()).unwrap();
        assert_eq!(ingested.samples, vec![62, -25]);
        assert!(ingested.rejected.is_empty());
    }

    #[test]
    fn test_parse_records_skips_blank_lines() {
        let input = "\nA 2006 1 1 0 1.0\n   \nA 2006 1 1 100 2.0\n";
        let ingested = parse_records(input.as_bytes()).unwrap();
        assert_eq!(ingested.samples, vec![10, 20]);
        assert!(ingested.rejected.is_empty());
    }

    #[test]
    fn test_parse_records_reports_bad_lines() {
        let input = "A 2006 1 1 0 1.5\nA 2006 1 1\nA 2006 1 1 100 warm\nA 2006 1 1 200 inf\n";
        let ingested = parse_records(input.as_bytes()).unwrap();
        assert_eq!(ingested.samples, vec![15]);
        assert_eq!(
            ingested.rejected,
            vec![
                Rejected {
                    line: 2,
                    reason: RejectReason::Truncated { fields: 4 },
                },
                Rejected {
                    line: 3,
                    reason: RejectReason::Malformed("warm".to_string()),
                },
                Rejected {
                    line: 4,
                    reason: RejectReason::OutOfRange("inf".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_reject_reason_display() {
        assert_eq!(
            RejectReason::Truncated { fields: 2 }.to_string(),
            "truncated record (2 of 6 fields)"
        );
        assert_eq!(
            RejectReason::Malformed("x".to_string()).to_string(),
            "malformed temperature 'x'"
        );
    }

    #[test]
    fn test_read_path_missing_file() {
        let result = read_path("/nonexistent/tempstat/input.txt");
        match result {
            Err(Error::Io { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/tempstat/input.txt"))
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
    }
}
