//! Design matrix for external training collaborators.
//! Layout: numeric features first, then one-hot identifier columns.

use crate::capture::Identifier;
use crate::features::FeatureTable;
use crate::labels::ClassLabel;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Numeric feature columns, in matrix order
pub const NUMERIC_FEATURES: [&str; 5] = ["n_frames", "mean_gap_ms", "std_gap_ms", "util_bits", "hyper_idx"];

#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// `[rows, NUMERIC_FEATURES.len() + categories.len()]`
    pub features: Array2<f32>,
    pub target: Array1<i64>,
    pub feature_names: Vec<String>,
    /// One-hot identifier categories, ascending
    pub categories: Vec<Identifier>,
}

impl DesignMatrix {
    pub fn from_table(table: &FeatureTable) -> Self {
        let mut index: BTreeMap<&Identifier, usize> = BTreeMap::new();
        for r in table.rows() {
            index.entry(&r.window.identifier).or_insert(0);
        }
        for (i, slot) in index.values_mut().enumerate() {
            *slot = i;
        }

        let n_num = NUMERIC_FEATURES.len();
        let width = n_num + index.len();
        let mut features = Array2::<f32>::zeros((table.len(), width));
        let mut target = Array1::<i64>::zeros(table.len());
        for (i, r) in table.rows().iter().enumerate() {
            let w = &r.window;
            let numeric = [
                w.n_frames as f32,
                w.mean_gap_ms as f32,
                w.std_gap_ms as f32,
                w.util_bits as f32,
                w.hyper_idx as f32,
            ];
            for (j, v) in numeric.iter().enumerate() {
                features[[i, j]] = *v;
            }
            features[[i, n_num + index[&w.identifier]]] = 1.0;
            target[i] = r.y.code() as i64;
        }

        let mut feature_names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        feature_names.extend(index.keys().map(|id| format!("Identifier_{}", id)));

        Self {
            features,
            target,
            feature_names,
            categories: index.into_keys().cloned().collect(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Balanced class weights `n / (classes_present * count)` for every class present
    pub fn class_weights(&self) -> BTreeMap<ClassLabel, f64> {
        let mut counts: BTreeMap<ClassLabel, usize> = BTreeMap::new();
        for &code in self.target.iter() {
            if let Ok(label) = ClassLabel::try_from(code as u8) {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        let n = self.target.len() as f64;
        let k = counts.len() as f64;
        counts
            .into_iter()
            .map(|(label, c)| (label, n / (k * c as f64)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::WindowAggregate;

    fn agg(id: &str, idx: i64, n: u64, dos: bool, fuzzy: bool) -> WindowAggregate {
        WindowAggregate {
            identifier: Identifier::normalize(id).unwrap(),
            hyper_idx: idx,
            n_frames: n,
            mean_gap_ms: 10.0,
            std_gap_ms: 0.5,
            util_bits: n * 111,
            has_dos: dos,
            has_fuzzy: fuzzy,
            has_imp: false,
        }
    }

    #[test]
    fn numeric_then_one_hot() {
        let table = FeatureTable::from_aggregates(vec![
            agg("0316", 0, 3, false, false),
            agg("0000", 1, 200, true, true),
            agg("0316", 1, 2, false, true),
        ]);
        let m = DesignMatrix::from_table(&table);
        assert_eq!(m.features.dim(), (3, 7));
        assert_eq!(m.feature_names[..5], NUMERIC_FEATURES.map(String::from));
        assert_eq!(m.feature_names[5], "Identifier_0000");
        assert_eq!(m.feature_names[6], "Identifier_0316");
        assert_eq!(m.features[[0, 0]], 3.0);
        assert_eq!(m.features[[0, 3]], 333.0);
        assert_eq!(m.features[[1, 4]], 1.0);
        // one-hot
        assert_eq!(m.features[[0, 6]], 1.0);
        assert_eq!(m.features[[0, 5]], 0.0);
        assert_eq!(m.features[[1, 5]], 1.0);
        assert_eq!(m.target.to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn balanced_weights() {
        let table = FeatureTable::from_aggregates(vec![
            agg("0316", 0, 3, false, false),
            agg("0316", 1, 3, false, false),
            agg("0316", 2, 3, false, false),
            agg("0000", 0, 9, true, false),
        ]);
        let w = DesignMatrix::from_table(&table).class_weights();
        assert_eq!(w.len(), 2);
        assert!((w[&ClassLabel::Normal] - 4.0 / 6.0).abs() < 1e-12);
        assert!((w[&ClassLabel::Dos] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_table() {
        let m = DesignMatrix::from_table(&FeatureTable::default());
        assert_eq!(m.n_rows(), 0);
        assert_eq!(m.features.ncols(), NUMERIC_FEATURES.len());
        assert!(m.class_weights().is_empty());
    }
}
