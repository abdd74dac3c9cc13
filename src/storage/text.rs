//! Uncompressed CSV table: fallback writer and tolerant loader for tables from other tools.

use super::{TableFormat, TableWriter};
use crate::capture::Identifier;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureRow, FeatureTable, WindowAggregate, COLUMNS};
use crate::labels::{ClassLabel, LabelSource};
use csv::StringRecord;
use std::path::Path;
use std::str::FromStr;

pub struct CsvWriter;

impl TableWriter for CsvWriter {
    fn format(&self) -> TableFormat {
        TableFormat::Csv
    }

    fn write(&self, table: &FeatureTable, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(COLUMNS)?;
        for r in table.rows() {
            let w = &r.window;
            wtr.write_record([
                w.identifier.to_string(),
                w.hyper_idx.to_string(),
                w.n_frames.to_string(),
                w.mean_gap_ms.to_string(),
                w.std_gap_ms.to_string(),
                w.util_bits.to_string(),
                (w.has_dos as u8).to_string(),
                (w.has_fuzzy as u8).to_string(),
                (w.has_imp as u8).to_string(),
                r.y.code().to_string(),
            ])?;
        }
        wtr.flush().map_err(|e| PipelineError::io(path, e))?;
        Ok(())
    }
}

struct Layout {
    identifier: usize,
    hyper_idx: usize,
    n_frames: usize,
    mean_gap_ms: usize,
    std_gap_ms: usize,
    util_bits: usize,
    has_dos: Option<usize>,
    has_fuzzy: Option<usize>,
    has_imp: Option<usize>,
    y: Option<usize>,
    label: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let need = |name: &str| {
            find(name).ok_or_else(|| PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };
        let layout = Self {
            identifier: need("Identifier")?,
            hyper_idx: need("hyper_idx")?,
            n_frames: need("n_frames")?,
            mean_gap_ms: need("mean_gap_ms")?,
            std_gap_ms: need("std_gap_ms")?,
            util_bits: need("util_bits")?,
            has_dos: find("has_dos"),
            has_fuzzy: find("has_fuzzy"),
            has_imp: find("has_imp"),
            y: find("y"),
            label: find("label"),
        };
        // without a resolved or explicit label every flag column is required
        if layout.y.is_none() && layout.label.is_none() {
            for (name, idx) in [("has_dos", layout.has_dos), ("has_fuzzy", layout.has_fuzzy), ("has_imp", layout.has_imp)] {
                if idx.is_none() {
                    return Err(PipelineError::MissingColumn {
                        path: path.to_path_buf(),
                        column: name.to_string(),
                    });
                }
            }
        }
        Ok(layout)
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str, row: usize) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| PipelineError::InvalidTable(format!("row {}: missing {}", row, name)))
}

fn parse<T: FromStr>(record: &StringRecord, idx: usize, name: &str, row: usize) -> Result<T> {
    let raw = field(record, idx, name, row)?;
    raw.parse::<T>()
        .map_err(|_| PipelineError::InvalidTable(format!("row {}: bad {} value {:?}", row, name, raw)))
}

fn parse_flag(record: &StringRecord, idx: Option<usize>, name: &str, row: usize) -> Result<bool> {
    let Some(idx) = idx else {
        return Ok(false);
    };
    let raw = field(record, idx, name, row)?;
    match raw {
        "1" | "true" | "True" | "1.0" => Ok(true),
        "0" | "false" | "False" | "0.0" | "" => Ok(false),
        _ => Err(PipelineError::InvalidTable(format!("row {}: bad {} value {:?}", row, name, raw))),
    }
}

fn parse_row(record: &StringRecord, l: &Layout, row: usize, path: &Path) -> Result<FeatureRow> {
    let raw_id = field(record, l.identifier, "Identifier", row)?;
    let identifier = Identifier::normalize(raw_id).ok_or_else(|| {
        PipelineError::InvalidTable(format!("{} row {}: bad Identifier {:?}", path.display(), row, raw_id))
    })?;
    let window = WindowAggregate {
        identifier,
        hyper_idx: parse(record, l.hyper_idx, "hyper_idx", row)?,
        n_frames: parse(record, l.n_frames, "n_frames", row)?,
        mean_gap_ms: parse(record, l.mean_gap_ms, "mean_gap_ms", row)?,
        std_gap_ms: parse(record, l.std_gap_ms, "std_gap_ms", row)?,
        util_bits: parse(record, l.util_bits, "util_bits", row)?,
        has_dos: parse_flag(record, l.has_dos, "has_dos", row)?,
        has_fuzzy: parse_flag(record, l.has_fuzzy, "has_fuzzy", row)?,
        has_imp: parse_flag(record, l.has_imp, "has_imp", row)?,
    };

    // precedence: resolved y, then explicit label text, then flags
    if let Some(idx) = l.y {
        let code: u8 = parse(record, idx, "y", row)?;
        return Ok(FeatureRow {
            window,
            y: ClassLabel::try_from(code)?,
        });
    }
    let explicit = l.label.map(|idx| field(record, idx, "label", row)).transpose()?;
    let source = LabelSource::choose(explicit, window.has_dos, window.has_fuzzy, window.has_imp)?;
    Ok(FeatureRow::with_source(window, source))
}

pub(super) fn read(path: &Path) -> Result<FeatureTable> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let layout = Layout::from_headers(&rdr.headers()?.clone(), path)?;
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        rows.push(parse_row(&record?, &layout, i + 1, path)?);
    }
    Ok(FeatureTable::from_rows(rows))
}
