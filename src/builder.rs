//! Feature table builder: read → normalize → profile/hyper-period → aggregate → label → persist.

use crate::capture::{read_all, CaptureSet, Event, SourceSplit};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::{FeatureTable, WindowAggregator};
use crate::labels::GroundTruth;
use crate::period::{compute_hyper_period, profile, write_profile_csv, HyperPeriod, IdentifierPeriodicity};
use crate::report::{detect_attack_onset, AttackOnset, RunSummary};
use crate::storage::persist;
use tracing::{info, warn};

/// Diagnostic periodicity output of one run
#[derive(Debug, Clone)]
pub struct PeriodicityReport {
    pub profile: Vec<IdentifierPeriodicity>,
    pub hyper_period: HyperPeriod,
}

pub struct FeatureTableBuilder {
    config: PipelineConfig,
    aggregator: WindowAggregator,
}

impl FeatureTableBuilder {
    /// Validates the config and resolves the sentinel identifiers.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let truth = GroundTruth::from_config(&config.labels)?;
        let aggregator = WindowAggregator::new(config.window.window_secs, truth);
        Ok(Self { config, aggregator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregate and label events into the feature table (no I/O).
    pub fn build_table(&self, events: &[Event]) -> FeatureTable {
        let aggregates = self.aggregator.aggregate(events);
        FeatureTable::from_aggregates(aggregates)
    }

    /// Per-identifier periodicity and the diagnostic hyper-period over the configured source capture.
    pub fn periodicity(&self, events: &[Event]) -> Result<PeriodicityReport> {
        let cfg = &self.config.periodicity;
        let source = cfg.source;
        let selected = events.iter().filter(|e| source.map_or(true, |s| e.split == s));
        let profile = profile(selected, cfg.resolution_secs);
        let hyper_period = compute_hyper_period(
            profile.iter().map(|p| Some(p.mode_period)),
            cfg.resolution_secs,
            cfg.max_period_secs,
        )?;
        Ok(PeriodicityReport { profile, hyper_period })
    }

    /// Onset over the fuzzy capture, or `None` when disabled.
    pub fn attack_onset(&self, events: &[Event]) -> Option<AttackOnset> {
        if !self.config.onset.enabled {
            return None;
        }
        let fuzzy = events.iter().filter(|e| e.split == SourceSplit::Fuzzy);
        Some(detect_attack_onset(fuzzy, &self.config.onset))
    }

    /// Run the whole batch from the configured captures and persist the table.
    pub fn run(&self) -> Result<RunSummary> {
        let captures = read_all(&self.config.input_dir, &self.config.captures)?;
        self.run_with(captures)
    }

    /// Same as [`run`](Self::run) for captures already in memory.
    /// The periodicity diagnostics never block the table: their failures are logged and
    /// leave `hyper_period` unset.
    pub fn run_with(&self, captures: CaptureSet) -> Result<RunSummary> {
        let CaptureSet { events, stats } = captures;
        info!(frames = events.len(), captures = stats.len(), "captures ready");

        let table = self.build_table(&events);
        if table.is_empty() {
            warn!("no frames survived ingestion; feature table is empty");
        }

        let saved = persist(&table, &self.config.output_path, self.config.output_format)?;

        let mut summary = RunSummary::new(&table, stats);
        if let Some(periodicity) = self.periodicity_diagnostics(&events) {
            summary.profiled_ids = periodicity.profile.len();
            summary.hyper_period = Some(periodicity.hyper_period);
        }
        summary.attack_onset = self.attack_onset(&events);
        summary.output = Some(saved);

        info!(
            rows = summary.rows,
            dos_rows = summary.flags.dos,
            fuzzy_rows = summary.flags.fuzzy,
            imp_rows = summary.flags.imp,
            reduction = summary.reduction_ratio(),
            "feature table built"
        );
        if let Some(onset) = &summary.attack_onset {
            info!(start_s = onset.start_secs, detected = onset.detected, "fuzzy attack onset");
        }
        Ok(summary)
    }

    fn periodicity_diagnostics(&self, events: &[Event]) -> Option<PeriodicityReport> {
        let periodicity = match self.periodicity(events) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "hyper-period unavailable");
                return None;
            }
        };
        info!(
            hyper_period_s = periodicity.hyper_period.seconds,
            periods = periodicity.hyper_period.period_ticks.len(),
            profiled_ids = periodicity.profile.len(),
            "hyper-period computed"
        );
        if let Some(path) = &self.config.periodicity.report_path {
            if let Err(e) = write_profile_csv(&periodicity.profile, path) {
                warn!(path = %path.display(), error = %e, "periodicity profile not written");
                return None;
            }
            info!(path = %path.display(), "periodicity profile written");
        }
        Some(periodicity)
    }
}
