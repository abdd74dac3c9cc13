//! Capture ingestion: per-split CSV logs into one normalized event stream.

mod identifier;
mod reader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use identifier::{Identifier, ID_WIDTH};
pub use reader::{read_all, read_capture, CaptureSet, ReadStats};

/// Which capture a frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSplit {
    Free,
    Dos,
    Fuzzy,
    Imp,
}

impl SourceSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSplit::Free => "free",
            SourceSplit::Dos => "dos",
            SourceSplit::Fuzzy => "fuzzy",
            SourceSplit::Imp => "imp",
        }
    }
}

impl fmt::Display for SourceSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub identifier: Identifier,
    /// Seconds since capture start
    pub timestamp: f64,
    /// DLC, 0..=8
    pub data_length: u8,
    pub split: SourceSplit,
}

impl Event {
    pub fn new(identifier: Identifier, timestamp: f64, data_length: u8, split: SourceSplit) -> Self {
        Self {
            identifier,
            timestamp,
            data_length,
            split,
        }
    }
}

/// One capture log on disk, relative to the configured input directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFile {
    pub split: SourceSplit,
    pub file: PathBuf,
}

impl CaptureFile {
    pub fn new(split: SourceSplit, file: impl Into<PathBuf>) -> Self {
        Self {
            split,
            file: file.into(),
        }
    }
}
