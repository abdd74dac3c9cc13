//! Canonical CAN identifier tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum width after left-zero-padding.
pub const ID_WIDTH: usize = 4;
/// Longest accepted token (29-bit extended identifiers).
const MAX_HEX_DIGITS: usize = 8;

/// Normalized identifier: upper-case hex, left-zero-padded to at least 4 digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Normalize a raw capture token: trim, drop an optional `0x`, upper-case, pad to 4.
    /// Returns `None` for empty, over-long or non-hex tokens.
    pub fn normalize(raw: &str) -> Option<Self> {
        let t = raw.trim();
        let t = t
            .strip_prefix("0x")
            .or_else(|| t.strip_prefix("0X"))
            .unwrap_or(t);
        if t.is_empty() || t.len() > MAX_HEX_DIGITS || !t.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("{:0>width$}", t.to_ascii_uppercase(), width = ID_WIDTH)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::normalize(&value).ok_or_else(|| format!("not a hex identifier: {:?}", value))
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
