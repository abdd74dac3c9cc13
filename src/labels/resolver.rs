//! Ground-truth class resolution. Precedence: dos > imp > fuzzy > normal.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ClassLabel {
    Normal = 0,
    Dos = 1,
    Fuzzy = 2,
    Imp = 3,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 4] = [ClassLabel::Normal, ClassLabel::Dos, ClassLabel::Fuzzy, ClassLabel::Imp];

    /// Precedence resolution over ground-truth flags; first match wins.
    pub fn from_flags(has_dos: bool, has_fuzzy: bool, has_imp: bool) -> Self {
        if has_dos {
            ClassLabel::Dos
        } else if has_imp {
            ClassLabel::Imp
        } else if has_fuzzy {
            ClassLabel::Fuzzy
        } else {
            ClassLabel::Normal
        }
    }

    /// Map an explicit textual label (`normal`, `dos`, `fuzzy`, `imp`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ClassLabel::Normal),
            "dos" => Ok(ClassLabel::Dos),
            "fuzzy" => Ok(ClassLabel::Fuzzy),
            "imp" => Ok(ClassLabel::Imp),
            _ => Err(PipelineError::UnknownLabel(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Normal => "normal",
            ClassLabel::Dos => "dos",
            ClassLabel::Fuzzy => "fuzzy",
            ClassLabel::Imp => "imp",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl From<ClassLabel> for u8 {
    fn from(label: ClassLabel) -> Self {
        label.code()
    }
}

impl TryFrom<u8> for ClassLabel {
    type Error = PipelineError;

    fn try_from(code: u8) -> Result<Self> {
        ClassLabel::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| PipelineError::UnknownLabel(code.to_string()))
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag-based resolution: dos -> 1, else imp -> 3, else fuzzy -> 2, else 0.
pub fn resolve_label(has_dos: bool, has_fuzzy: bool, has_imp: bool) -> ClassLabel {
    ClassLabel::from_flags(has_dos, has_fuzzy, has_imp)
}

/// Where a row's class comes from. Exactly one path runs per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Upstream label column; flags are ignored
    Explicit(ClassLabel),
    Flags { dos: bool, fuzzy: bool, imp: bool },
}

impl LabelSource {
    /// Explicit text wins whenever it is present.
    pub fn choose(explicit: Option<&str>, dos: bool, fuzzy: bool, imp: bool) -> Result<Self> {
        match explicit {
            Some(text) => Ok(LabelSource::Explicit(ClassLabel::from_name(text)?)),
            None => Ok(LabelSource::Flags { dos, fuzzy, imp }),
        }
    }

    pub fn resolve(self) -> ClassLabel {
        match self {
            LabelSource::Explicit(label) => label,
            LabelSource::Flags { dos, fuzzy, imp } => resolve_label(dos, fuzzy, imp),
        }
    }
}
