//! Device index identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator-supplied identifier for one accelerator slot.
///
/// Indices are opaque: `"1"` and `"01"` name different slots. The inner
/// String is private so construction goes through [`DeviceIndex::new`],
/// which trims surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIndex(String);

impl DeviceIndex {
    /// Create a new `DeviceIndex`. Returns `None` for blank input.
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Get the index as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated index list, keeping order and duplicates.
    ///
    /// Empty segments are skipped, so `"0,,1"` yields `[0, 1]` and `""`
    /// yields an empty list.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(Self::new).collect()
    }
}

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
