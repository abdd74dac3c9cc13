//! Pipeline configuration. Every constant of the run (paths, window, resolution,
//! sentinels, onset heuristic) lives here; nothing is a hidden module-level literal.

use crate::capture::{CaptureFile, Identifier, SourceSplit};
use crate::error::{PipelineError, Result};
use crate::storage::TableFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the capture CSVs
    pub input_dir: PathBuf,
    /// Capture logs, relative to `input_dir`
    pub captures: Vec<CaptureFile>,
    /// Feature table destination; the CSV fallback swaps the extension
    pub output_path: PathBuf,
    /// Preferred table format
    pub output_format: TableFormat,
    pub window: WindowConfig,
    pub periodicity: PeriodicityConfig,
    pub labels: LabelConfig,
    pub onset: OnsetConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Aggregation window (seconds); fixed, independent of the computed hyper-period
    pub window_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicityConfig {
    /// Gap rounding resolution (seconds), shared by the estimator and the hyper-period
    pub resolution_secs: f64,
    /// Periods at or above this are treated as non-periodic noise
    pub max_period_secs: f64,
    /// Capture used for period estimation; `None` pools all captures
    pub source: Option<SourceSplit>,
    /// Optional CSV dump of the per-identifier periodicity profile
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Reserved identifier injected by the DoS attacker
    pub dos_id: String,
    /// Identifier spoofed by the impersonation attacker
    pub imp_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetConfig {
    pub enabled: bool,
    /// Novel identifiers in one window needed to call the onset
    pub novel_id_threshold: usize,
    pub window_secs: f64,
    /// Reported when no window crosses the threshold
    pub default_start_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("Processed"),
            captures: vec![
                CaptureFile::new(SourceSplit::Free, "Attack_free_dataset_SampleTwo.csv"),
                CaptureFile::new(SourceSplit::Dos, "DoS_attack_dataset_SampleTwo.csv"),
                CaptureFile::new(SourceSplit::Fuzzy, "Fuzzy_attack_dataset_SampleTwo.csv"),
                CaptureFile::new(SourceSplit::Imp, "Impersonation_attack_dataset_SampleTwo.csv"),
            ],
            output_path: PathBuf::from("otids_hyper_dataset.zst"),
            output_format: TableFormat::Columnar,
            window: WindowConfig::default(),
            periodicity: PeriodicityConfig::default(),
            labels: LabelConfig::default(),
            onset: OnsetConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { window_secs: 5.0 }
    }
}

impl Default for PeriodicityConfig {
    fn default() -> Self {
        Self {
            resolution_secs: 0.0001,
            max_period_secs: 5.0,
            source: Some(SourceSplit::Fuzzy),
            report_path: None,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            dos_id: "0000".to_string(),
            imp_id: "0164".to_string(),
        }
    }
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            novel_id_threshold: 100,
            window_secs: 1.0,
            default_start_secs: 250.0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!("{} must be a positive number, got {}", name, v)))
    }
}

impl PipelineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<PipelineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Strict variant of [`load`](Self::load): a present but unreadable or malformed file is an error.
    pub fn try_load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn validate(&self) -> Result<()> {
        positive("window.window_secs", self.window.window_secs)?;
        positive("periodicity.resolution_secs", self.periodicity.resolution_secs)?;
        positive("periodicity.max_period_secs", self.periodicity.max_period_secs)?;
        positive("onset.window_secs", self.onset.window_secs)?;
        if !self.onset.default_start_secs.is_finite() {
            return Err(PipelineError::InvalidConfig("onset.default_start_secs must be finite".into()));
        }
        if self.captures.is_empty() {
            return Err(PipelineError::InvalidConfig("no captures configured".into()));
        }
        for (name, raw) in [("labels.dos_id", &self.labels.dos_id), ("labels.imp_id", &self.labels.imp_id)] {
            if Identifier::normalize(raw).is_none() {
                return Err(PipelineError::InvalidConfig(format!("{} {:?} is not a hex identifier", name, raw)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let c = PipelineConfig::default();
        c.validate().unwrap();
        assert_eq!(c.captures.len(), 4);
        assert_eq!(c.window.window_secs, 5.0);
        assert_eq!(c.periodicity.resolution_secs, 0.0001);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: PipelineConfig =
            serde_json::from_str(r#"{"window":{"window_secs":2.5},"labels":{"imp_id":"1A0"},"output_format":"csv"}"#)
                .unwrap();
        assert_eq!(c.window.window_secs, 2.5);
        assert_eq!(c.labels.imp_id, "1A0");
        assert_eq!(c.labels.dos_id, "0000");
        assert_eq!(c.output_format, TableFormat::Csv);
        assert_eq!(c.onset.novel_id_threshold, 100);
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = PipelineConfig::default();
        c.window.window_secs = 0.0;
        assert!(matches!(c.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut c = PipelineConfig::default();
        c.periodicity.resolution_secs = f64::NAN;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.labels.dos_id = "nope".into();
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.captures.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn try_load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PipelineConfig::try_load(&path), Err(PipelineError::Json(_))));
        assert_eq!(PipelineConfig::load(&path).window.window_secs, 5.0);
    }
}
