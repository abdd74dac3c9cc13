//! Columnar table file: one JSON document of column arrays, zstd-compressed.

use super::{TableFormat, TableWriter};
use crate::capture::Identifier;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureRow, FeatureTable, WindowAggregate};
use crate::labels::ClassLabel;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const COLUMNAR_FORMAT: &str = "can-hyper-columnar";
pub const COLUMNAR_VERSION: u32 = 1;
/// zstd frame magic, used to tell columnar files from CSV
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

#[derive(Debug, Serialize, Deserialize)]
struct Columns {
    format: String,
    version: u32,
    n_rows: usize,
    #[serde(rename = "Identifier")]
    identifier: Vec<Identifier>,
    hyper_idx: Vec<i64>,
    n_frames: Vec<u64>,
    mean_gap_ms: Vec<f64>,
    std_gap_ms: Vec<f64>,
    util_bits: Vec<u64>,
    has_dos: Vec<u8>,
    has_fuzzy: Vec<u8>,
    has_imp: Vec<u8>,
    y: Vec<ClassLabel>,
}

impl Columns {
    fn from_table(table: &FeatureTable) -> Self {
        let rows = table.rows();
        Self {
            format: COLUMNAR_FORMAT.to_string(),
            version: COLUMNAR_VERSION,
            n_rows: rows.len(),
            identifier: rows.iter().map(|r| r.window.identifier.clone()).collect(),
            hyper_idx: rows.iter().map(|r| r.window.hyper_idx).collect(),
            n_frames: rows.iter().map(|r| r.window.n_frames).collect(),
            mean_gap_ms: rows.iter().map(|r| r.window.mean_gap_ms).collect(),
            std_gap_ms: rows.iter().map(|r| r.window.std_gap_ms).collect(),
            util_bits: rows.iter().map(|r| r.window.util_bits).collect(),
            has_dos: rows.iter().map(|r| r.window.has_dos as u8).collect(),
            has_fuzzy: rows.iter().map(|r| r.window.has_fuzzy as u8).collect(),
            has_imp: rows.iter().map(|r| r.window.has_imp as u8).collect(),
            y: rows.iter().map(|r| r.y).collect(),
        }
    }

    fn into_table(self) -> Result<FeatureTable> {
        if self.format != COLUMNAR_FORMAT || self.version != COLUMNAR_VERSION {
            return Err(PipelineError::InvalidTable(format!(
                "unsupported columnar header {} v{}",
                self.format, self.version
            )));
        }
        let n = self.n_rows;
        let lengths = [
            ("Identifier", self.identifier.len()),
            ("hyper_idx", self.hyper_idx.len()),
            ("n_frames", self.n_frames.len()),
            ("mean_gap_ms", self.mean_gap_ms.len()),
            ("std_gap_ms", self.std_gap_ms.len()),
            ("util_bits", self.util_bits.len()),
            ("has_dos", self.has_dos.len()),
            ("has_fuzzy", self.has_fuzzy.len()),
            ("has_imp", self.has_imp.len()),
            ("y", self.y.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(PipelineError::InvalidTable(format!("column {} has {} values, expected {}", name, len, n)));
        }

        let rows = (0..n)
            .map(|i| FeatureRow {
                window: WindowAggregate {
                    identifier: self.identifier[i].clone(),
                    hyper_idx: self.hyper_idx[i],
                    n_frames: self.n_frames[i],
                    mean_gap_ms: self.mean_gap_ms[i],
                    std_gap_ms: self.std_gap_ms[i],
                    util_bits: self.util_bits[i],
                    has_dos: self.has_dos[i] != 0,
                    has_fuzzy: self.has_fuzzy[i] != 0,
                    has_imp: self.has_imp[i] != 0,
                },
                y: self.y[i],
            })
            .collect();
        Ok(FeatureTable::from_rows(rows))
    }
}

/// zstd compression level for table files
const DEFAULT_LEVEL: i32 = 3;

pub struct ColumnarWriter {
    #[cfg_attr(not(feature = "columnar"), allow(dead_code))]
    level: i32,
}

impl Default for ColumnarWriter {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL }
    }
}

impl ColumnarWriter {
    pub fn with_level(level: i32) -> Self {
        Self { level }
    }
}

#[cfg(feature = "columnar")]
impl TableWriter for ColumnarWriter {
    fn format(&self) -> TableFormat {
        TableFormat::Columnar
    }

    fn write(&self, table: &FeatureTable, path: &Path) -> Result<()> {
        use std::io::Write;

        let file = std::fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
        let mut encoder = zstd::stream::write::Encoder::new(std::io::BufWriter::new(file), self.level)
            .map_err(|e| PipelineError::io(path, e))?;
        serde_json::to_writer(&mut encoder, &Columns::from_table(table))?;
        let mut inner = encoder.finish().map_err(|e| PipelineError::io(path, e))?;
        inner.flush().map_err(|e| PipelineError::io(path, e))?;
        Ok(())
    }
}

#[cfg(not(feature = "columnar"))]
impl TableWriter for ColumnarWriter {
    fn format(&self) -> TableFormat {
        TableFormat::Columnar
    }

    fn write(&self, _table: &FeatureTable, _path: &Path) -> Result<()> {
        Err(PipelineError::WriterUnavailable(TableFormat::Columnar))
    }
}

#[cfg(feature = "columnar")]
pub(super) fn read(path: &Path) -> Result<FeatureTable> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let decoder = zstd::stream::read::Decoder::new(file).map_err(|e| PipelineError::io(path, e))?;
    let columns: Columns = serde_json::from_reader(decoder)?;
    columns.into_table()
}

#[cfg(not(feature = "columnar"))]
pub(super) fn read(path: &Path) -> Result<FeatureTable> {
    Err(PipelineError::InvalidTable(format!(
        "{} is a columnar table but columnar support is not built in",
        path.display()
    )))
}

#[cfg(all(test, feature = "columnar"))]
mod tests {
    use super::*;
    use crate::storage::tests::sample_table;

    #[test]
    fn file_starts_with_zstd_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.zst");
        ColumnarWriter::with_level(1).write(&sample_table(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes[..4], ZSTD_MAGIC);
    }

    #[test]
    fn ragged_columns_rejected() {
        let mut cols = Columns::from_table(&sample_table());
        cols.util_bits.pop();
        let err = cols.into_table().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTable(ref m) if m.contains("util_bits")));
    }

    #[test]
    fn out_of_range_label_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.zst");
        let mut doc = serde_json::to_value(Columns::from_table(&sample_table())).unwrap();
        doc["y"][0] = serde_json::json!(7);
        let raw = serde_json::to_vec(&doc).unwrap();
        std::fs::write(&path, zstd::encode_all(&raw[..], 3).unwrap()).unwrap();
        assert!(read(&path).is_err());
    }
}
