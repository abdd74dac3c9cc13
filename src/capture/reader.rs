//! CSV capture reader. Rows that cannot be normalized are rejected, counted and logged.

use super::{CaptureFile, Event, Identifier, SourceSplit};
use crate::error::{PipelineError, Result};
use csv::{ByteRecord, ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const COL_IDENTIFIER: &str = "Identifier";
const COL_TIME: &str = "Time";
const COL_DLC: &str = "DLC";
const MAX_DLC: u8 = 8;

/// Per-capture ingestion accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadStats {
    pub split: SourceSplit,
    pub path: PathBuf,
    pub sha256: String,
    pub accepted: u64,
    pub rejected_identifier: u64,
    pub rejected_time: u64,
    pub rejected_dlc: u64,
}

impl ReadStats {
    fn new(split: SourceSplit, path: &Path) -> Self {
        Self {
            split,
            path: path.to_path_buf(),
            sha256: String::new(),
            accepted: 0,
            rejected_identifier: 0,
            rejected_time: 0,
            rejected_dlc: 0,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_identifier + self.rejected_time + self.rejected_dlc
    }
}

/// All captures of a run, concatenated in configuration order
#[derive(Debug, Clone, Default)]
pub struct CaptureSet {
    pub events: Vec<Event>,
    pub stats: Vec<ReadStats>,
}

enum Reject {
    Identifier,
    Time,
    Dlc,
}

fn column(headers: &ByteRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name.as_bytes())
        .ok_or_else(|| PipelineError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut h = Sha256::new();
    std::io::copy(&mut file, &mut h).map_err(|e| PipelineError::io(path, e))?;
    Ok(format!("{:x}", h.finalize()))
}

/// One field as text; invalid UTF-8 counts as unreadable.
fn text(record: &ByteRecord, col: usize) -> Option<&str> {
    record.get(col).and_then(|f| std::str::from_utf8(f).ok())
}

fn parse_row(
    record: &ByteRecord,
    cols: (usize, usize, usize),
    split: SourceSplit,
) -> std::result::Result<Event, Reject> {
    let (id_col, time_col, dlc_col) = cols;
    let identifier = text(record, id_col)
        .and_then(Identifier::normalize)
        .ok_or(Reject::Identifier)?;
    let timestamp = text(record, time_col)
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or(Reject::Time)?;
    let data_length = text(record, dlc_col)
        .and_then(|d| d.parse::<u8>().ok())
        .filter(|d| *d <= MAX_DLC)
        .ok_or(Reject::Dlc)?;
    Ok(Event::new(identifier, timestamp, data_length, split))
}

/// Read one capture log. Needs `Identifier`, `Time` and `DLC` headers; other columns are ignored.
pub fn read_capture(path: &Path, split: SourceSplit) -> Result<(Vec<Event>, ReadStats)> {
    let mut stats = ReadStats::new(split, path);
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers = rdr.byte_headers()?.clone();
    let cols = (
        column(&headers, COL_IDENTIFIER, path)?,
        column(&headers, COL_TIME, path)?,
        column(&headers, COL_DLC, path)?,
    );

    let mut events = Vec::new();
    for (line, record) in rdr.byte_records().enumerate() {
        let record = record?;
        match parse_row(&record, cols, split) {
            Ok(ev) => {
                stats.accepted += 1;
                events.push(ev);
            }
            Err(reason) => {
                let field = match reason {
                    Reject::Identifier => {
                        stats.rejected_identifier += 1;
                        COL_IDENTIFIER
                    }
                    Reject::Time => {
                        stats.rejected_time += 1;
                        COL_TIME
                    }
                    Reject::Dlc => {
                        stats.rejected_dlc += 1;
                        COL_DLC
                    }
                };
                debug!(path = %path.display(), row = line + 1, field, "rejected capture row");
            }
        }
    }

    if stats.rejected() > 0 {
        warn!(
            split = %split,
            path = %path.display(),
            rejected_identifier = stats.rejected_identifier,
            rejected_time = stats.rejected_time,
            rejected_dlc = stats.rejected_dlc,
            "capture rows rejected"
        );
    }
    stats.sha256 = sha256_file(path)?;
    Ok((events, stats))
}

/// Read every configured capture under `input_dir`.
/// All files are checked up front so a missing one aborts before any work is done.
pub fn read_all(input_dir: &Path, captures: &[CaptureFile]) -> Result<CaptureSet> {
    let paths: Vec<(SourceSplit, PathBuf)> = captures
        .iter()
        .map(|c| (c.split, input_dir.join(&c.file)))
        .collect();
    if let Some((split, path)) = paths.iter().find(|(_, p)| !p.is_file()) {
        return Err(PipelineError::MissingInput {
            split: *split,
            path: path.clone(),
        });
    }

    let mut set = CaptureSet::default();
    for (split, path) in paths {
        let (events, stats) = read_capture(&path, split)?;
        info!(split = %split, path = %path.display(), frames = events.len(), "capture loaded");
        set.events.extend(events);
        set.stats.push(stats);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "free.csv",
            "Time,Identifier,DLC,D0\n0.5, 164 ,8,00\n0.6,0164,2,11\n",
        );
        let (events, stats) = read_capture(&path, SourceSplit::Free).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].identifier, events[1].identifier);
        assert_eq!(events[0].identifier, "0164");
        assert_eq!(events[1].data_length, 2);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.sha256.len(), 64);
    }

    #[test]
    fn rejects_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "dos.csv",
            "Identifier,Time,DLC\nzz,0.1,8\n0316,abc,8\n0316,-1,8\n0316,0.2,9\n0316,0.3,8\n",
        );
        let (events, stats) = read_capture(&path, SourceSplit::Dos).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(stats.rejected_identifier, 1);
        assert_eq!(stats.rejected_time, 2);
        assert_eq!(stats.rejected_dlc, 1);
        assert_eq!(stats.rejected(), 4);
    }

    #[test]
    fn invalid_utf8_only_rejects_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuzzy.csv");
        let mut body = b"Identifier,Time,DLC,Data\n".to_vec();
        body.extend_from_slice(b"0316,0.1,8,\xff\xfe\n");
        body.extend_from_slice(b"03\xff6,0.2,8,00\n");
        body.extend_from_slice(b"0316,0.\xc3,8,00\n");
        body.extend_from_slice(b"0316,0.4,8,00\n");
        std::fs::write(&path, body).unwrap();
        let (events, stats) = read_capture(&path, SourceSplit::Fuzzy).unwrap();
        // garbage in an ignored column does not matter
        assert_eq!(events.len(), 2);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected_identifier, 1);
        assert_eq!(stats.rejected_time, 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "imp.csv", "Identifier,Time\n0164,0.1\n");
        let err = read_capture(&path, SourceSplit::Imp).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "DLC"));
    }

    #[test]
    fn missing_file_aborts_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "free.csv", "Identifier,Time,DLC\n0316,0.0,8\n");
        let captures = vec![
            CaptureFile::new(SourceSplit::Free, "free.csv"),
            CaptureFile::new(SourceSplit::Fuzzy, "fuzzy.csv"),
        ];
        match read_all(dir.path(), &captures) {
            Err(PipelineError::MissingInput { split, path }) => {
                assert_eq!(split, SourceSplit::Fuzzy);
                assert!(path.ends_with("fuzzy.csv"));
            }
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }
}
