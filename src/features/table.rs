//! Labeled feature table handed to training collaborators.

use super::WindowAggregate;
use crate::labels::{ClassLabel, LabelSource};
use serde::{Deserialize, Serialize};

/// Column order shared by every persisted format
pub const COLUMNS: [&str; 10] = [
    "Identifier",
    "hyper_idx",
    "n_frames",
    "mean_gap_ms",
    "std_gap_ms",
    "util_bits",
    "has_dos",
    "has_fuzzy",
    "has_imp",
    "y",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub window: WindowAggregate,
    pub y: ClassLabel,
}

impl FeatureRow {
    /// Label from the row's own ground-truth flags.
    pub fn labeled(window: WindowAggregate) -> Self {
        let source = LabelSource::Flags {
            dos: window.has_dos,
            fuzzy: window.has_fuzzy,
            imp: window.has_imp,
        };
        Self::with_source(window, source)
    }

    pub fn with_source(window: WindowAggregate, source: LabelSource) -> Self {
        Self {
            window,
            y: source.resolve(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCounts {
    pub dos: u64,
    pub fuzzy: u64,
    pub imp: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub normal: u64,
    pub dos: u64,
    pub fuzzy: u64,
    pub imp: u64,
}

impl ClassCounts {
    pub fn get(&self, label: ClassLabel) -> u64 {
        match label {
            ClassLabel::Normal => self.normal,
            ClassLabel::Dos => self.dos,
            ClassLabel::Fuzzy => self.fuzzy,
            ClassLabel::Imp => self.imp,
        }
    }

    fn bump(&mut self, label: ClassLabel) {
        match label {
            ClassLabel::Normal => self.normal += 1,
            ClassLabel::Dos => self.dos += 1,
            ClassLabel::Fuzzy => self.fuzzy += 1,
            ClassLabel::Imp => self.imp += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn from_rows(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    /// Resolve each aggregate's label from its flags.
    pub fn from_aggregates(aggregates: Vec<WindowAggregate>) -> Self {
        Self {
            rows: aggregates.into_iter().map(FeatureRow::labeled).collect(),
        }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with each attack flag set; a row can count toward several flags.
    pub fn flag_counts(&self) -> FlagCounts {
        let mut c = FlagCounts::default();
        for r in &self.rows {
            c.dos += r.window.has_dos as u64;
            c.fuzzy += r.window.has_fuzzy as u64;
            c.imp += r.window.has_imp as u64;
        }
        c
    }

    pub fn class_counts(&self) -> ClassCounts {
        let mut c = ClassCounts::default();
        for r in &self.rows {
            c.bump(r.y);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Identifier;

    fn agg(id: &str, dos: bool, fuzzy: bool, imp: bool) -> WindowAggregate {
        WindowAggregate {
            identifier: Identifier::normalize(id).unwrap(),
            hyper_idx: 0,
            n_frames: 1,
            mean_gap_ms: 0.0,
            std_gap_ms: 0.0,
            util_bits: 111,
            has_dos: dos,
            has_fuzzy: fuzzy,
            has_imp: imp,
        }
    }

    #[test]
    fn counts_flags_and_classes() {
        let table = FeatureTable::from_aggregates(vec![
            agg("0000", true, true, false),
            agg("0164", false, true, true),
            agg("0316", false, true, false),
            agg("0043", false, false, false),
        ]);
        assert_eq!(
            table.flag_counts(),
            FlagCounts {
                dos: 1,
                fuzzy: 3,
                imp: 1
            }
        );
        let classes = table.class_counts();
        assert_eq!(classes.get(ClassLabel::Dos), 1);
        assert_eq!(classes.get(ClassLabel::Imp), 1);
        assert_eq!(classes.get(ClassLabel::Fuzzy), 1);
        assert_eq!(classes.get(ClassLabel::Normal), 1);
        assert_eq!(table.rows()[0].y, ClassLabel::Dos);
    }

    #[test]
    fn explicit_source_ignores_flags() {
        let row = FeatureRow::with_source(agg("0000", true, false, false), LabelSource::Explicit(ClassLabel::Normal));
        assert_eq!(row.y, ClassLabel::Normal);
    }
}
