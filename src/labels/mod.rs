//! Ground-truth labeling of window aggregates.

mod resolver;

pub use resolver::{resolve_label, ClassLabel, LabelSource};

use crate::capture::{Event, Identifier, SourceSplit};
use crate::config::LabelConfig;
use crate::error::{PipelineError, Result};

/// Known attacker identifiers and the capture whose traffic is attack-positive as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruth {
    pub dos_id: Identifier,
    pub imp_id: Identifier,
}

impl GroundTruth {
    pub fn from_config(config: &LabelConfig) -> Result<Self> {
        let norm = |raw: &str, what: &str| {
            Identifier::normalize(raw)
                .ok_or_else(|| PipelineError::InvalidConfig(format!("{} sentinel {:?} is not a hex identifier", what, raw)))
        };
        Ok(Self {
            dos_id: norm(&config.dos_id, "dos")?,
            imp_id: norm(&config.imp_id, "imp")?,
        })
    }

    pub fn is_dos(&self, e: &Event) -> bool {
        e.identifier == self.dos_id
    }

    pub fn is_imp(&self, e: &Event) -> bool {
        e.identifier == self.imp_id
    }

    /// Entire fuzzy capture counts as attack traffic, whatever the identifier
    pub fn is_fuzzy(&self, e: &Event) -> bool {
        e.split == SourceSplit::Fuzzy
    }
}
