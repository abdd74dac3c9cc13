//! Feature table persistence: zstd columnar preferred, CSV fallback, format-sniffing loader.

mod columnar;
mod text;

pub use columnar::{ColumnarWriter, COLUMNAR_FORMAT, COLUMNAR_VERSION, ZSTD_MAGIC};
pub use text::CsvWriter;

use crate::error::{PipelineError, Result};
use crate::features::FeatureTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// zstd-compressed column arrays
    Columnar,
    /// Uncompressed row-oriented text
    Csv,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Columnar => "zst",
            TableFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableFormat::Columnar => "columnar",
            TableFormat::Csv => "csv",
        })
    }
}

/// Writes a complete table to one file.
pub trait TableWriter {
    fn format(&self) -> TableFormat;
    fn write(&self, table: &FeatureTable, path: &Path) -> Result<()>;
}

/// Where and how a table ended up on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTable {
    pub path: PathBuf,
    pub format: TableFormat,
    pub rows: usize,
    pub bytes: u64,
    /// True when the preferred writer failed and the CSV fallback was used
    pub fell_back: bool,
}

fn writer_for(format: TableFormat) -> Box<dyn TableWriter> {
    match format {
        TableFormat::Columnar => Box::new(ColumnarWriter::default()),
        TableFormat::Csv => Box::new(CsvWriter),
    }
}

fn write_with(writer: &dyn TableWriter, table: &FeatureTable, path: &Path) -> Result<PersistedTable> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    writer.write(table, path)?;
    let bytes = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?.len();
    info!(path = %path.display(), format = %writer.format(), rows = table.len(), bytes, "feature table saved");
    Ok(PersistedTable {
        path: path.to_path_buf(),
        format: writer.format(),
        rows: table.len(),
        bytes,
        fell_back: false,
    })
}

/// Persist `table` in the `preferred` format. If the columnar writer is unavailable or fails,
/// the table is written as CSV next to `path` (extension swapped to `.csv`).
pub fn persist(table: &FeatureTable, path: &Path, preferred: TableFormat) -> Result<PersistedTable> {
    let writer = writer_for(preferred);
    match write_with(writer.as_ref(), table, path) {
        Err(e) if preferred != TableFormat::Csv => {
            warn!(format = %preferred, path = %path.display(), error = %e, "table writer failed; falling back to csv");
            let _ = std::fs::remove_file(path);
            let fallback = path.with_extension(TableFormat::Csv.extension());
            let mut saved = write_with(&CsvWriter, table, &fallback)?;
            saved.fell_back = true;
            Ok(saved)
        }
        other => other,
    }
}

fn sniff(path: &Path) -> Result<TableFormat> {
    let mut head = [0u8; 4];
    let mut f = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let n = f.read(&mut head).map_err(|e| PipelineError::io(path, e))?;
    Ok(if n == head.len() && head == ZSTD_MAGIC {
        TableFormat::Columnar
    } else {
        TableFormat::Csv
    })
}

/// Load a persisted table. A missing `path` with an existing `.csv` sibling loads the sibling,
/// mirroring the writer fallback. The format is detected from the file content.
pub fn load_table(path: &Path) -> Result<FeatureTable> {
    let fallback = path.with_extension(TableFormat::Csv.extension());
    let source = if !path.exists() && fallback.is_file() {
        debug!(missing = %path.display(), using = %fallback.display(), "loading csv fallback table");
        fallback
    } else {
        path.to_path_buf()
    };
    match sniff(&source)? {
        TableFormat::Columnar => columnar::read(&source),
        TableFormat::Csv => text::read(&source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Identifier;
    use crate::features::{FeatureRow, WindowAggregate};

    pub(crate) fn sample_table() -> FeatureTable {
        let rows = [
            ("0000", 0, 300, 0.5, 0.1234567890123, true, true, false),
            ("0164", 1, 2, 10.25, 0.0, false, true, true),
            ("0316", 2, 1, 0.0, 0.0, false, false, false),
            ("05F0", 49, 17, 1.0 / 3.0, 2.0f64.sqrt(), false, true, false),
        ];
        FeatureTable::from_aggregates(
            rows.iter()
                .map(|(id, idx, n, mean, std, dos, fuzzy, imp)| WindowAggregate {
                    identifier: Identifier::normalize(id).unwrap(),
                    hyper_idx: *idx,
                    n_frames: *n,
                    mean_gap_ms: *mean,
                    std_gap_ms: *std,
                    util_bits: n * 111,
                    has_dos: *dos,
                    has_fuzzy: *fuzzy,
                    has_imp: *imp,
                })
                .collect(),
        )
    }

    #[test]
    fn csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let table = sample_table();
        let saved = persist(&table, &path, TableFormat::Csv).unwrap();
        assert_eq!(saved.format, TableFormat::Csv);
        assert!(!saved.fell_back);
        assert_eq!(load_table(&path).unwrap(), table);
    }

    #[cfg(feature = "columnar")]
    #[test]
    fn columnar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("table.zst");
        let table = sample_table();
        let saved = persist(&table, &path, TableFormat::Columnar).unwrap();
        assert_eq!(saved.format, TableFormat::Columnar);
        assert_eq!(saved.path, path);
        assert_eq!(saved.rows, 4);
        assert!(saved.bytes > 0);
        assert_eq!(sniff(&path).unwrap(), TableFormat::Columnar);
        assert_eq!(load_table(&path).unwrap(), table);
    }

    #[cfg(not(feature = "columnar"))]
    #[test]
    fn columnar_unavailable_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.zst");
        let table = sample_table();
        let saved = persist(&table, &path, TableFormat::Columnar).unwrap();
        assert!(saved.fell_back);
        assert_eq!(saved.format, TableFormat::Csv);
        assert_eq!(saved.path, dir.path().join("table.csv"));
        // loading by the preferred path finds the sibling
        assert_eq!(load_table(&path).unwrap(), table);
    }

    #[test]
    fn failing_writer_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the columnar path makes that writer fail
        let path = dir.path().join("table.zst");
        std::fs::create_dir(&path).unwrap();
        let table = sample_table();
        let saved = persist(&table, &path, TableFormat::Columnar).unwrap();
        assert!(saved.fell_back);
        assert_eq!(saved.path, dir.path().join("table.csv"));
        assert_eq!(load_table(&saved.path).unwrap().len(), table.len());
    }

    #[test]
    fn explicit_row_labels_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let mut rows: Vec<FeatureRow> = sample_table().rows().to_vec();
        rows[0].y = crate::labels::ClassLabel::Normal;
        let table = FeatureTable::from_rows(rows);
        persist(&table, &path, TableFormat::Csv).unwrap();
        assert_eq!(load_table(&path).unwrap().rows()[0].y, crate::labels::ClassLabel::Normal);
    }
}
