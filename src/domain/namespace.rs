//! Namespace derivation for isolated instance groups.

use std::fmt::{self, Write};

use serde::Serialize;

use super::index::DeviceIndex;

/// Prefix used when no project prefix is configured.
pub const DEFAULT_PREFIX: &str = "instance";

/// Unique scope for one device's runtime group.
///
/// Every resource the runtime creates for an instance is named under its
/// namespace, so two namespaces never share containers, networks or volumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace for `index` under `prefix`.
    ///
    /// Lowercase ASCII letters and digits are copied through. Every other
    /// byte, `_` included, becomes `_` plus two lowercase hex digits. The
    /// escape is prefix-free, so the mapping is injective: `"A"` and `"a"`
    /// or `"1"` and `"01"` never collide.
    #[must_use]
    pub fn derive(prefix: &str, index: &DeviceIndex) -> Self {
        let mut name = String::with_capacity(prefix.len() + 1 + index.as_str().len());
        name.push_str(prefix);
        name.push('-');
        for byte in index.as_str().bytes() {
            if byte.is_ascii_lowercase() || byte.is_ascii_digit() {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "_{byte:02x}");
            }
        }
        Self(name)
    }

    /// Get the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check that `prefix` is usable as the start of a compose project name.
pub fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn ns(raw: &str) -> Namespace {
        Namespace::derive(DEFAULT_PREFIX, &DeviceIndex::new(raw).expect("index"))
    }

    #[test]
    fn plain_index_reads_naturally() {
        assert_eq!(ns("3").as_str(), "instance-3");
    }

    #[test]
    fn leading_zero_does_not_collide() {
        assert_ne!(ns("1"), ns("01"));
    }

    #[test]
    fn case_and_escapes_do_not_collide() {
        let inputs = ["A", "a", "_41", "a_b", "a-b", "a.b", "gpu0", "GPU0", "_"];
        let derived: HashSet<_> = inputs.iter().map(|raw| ns(raw)).collect();
        assert_eq!(derived.len(), inputs.len());
    }

    #[test]
    fn derived_names_stay_in_project_alphabet() {
        for raw in ["Ab/C", "é", "1 2", "x;rm -rf"] {
            let name = ns(raw);
            assert!(
                is_valid_prefix(name.as_str()),
                "{name} is not a valid project name"
            );
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(ns("7"), ns("7"));
    }

    #[test]
    fn prefix_validation() {
        assert!(is_valid_prefix("instance"));
        assert!(is_valid_prefix("gpu_fleet-1"));
        assert!(!is_valid_prefix(""));
        assert!(!is_valid_prefix("-x"));
        assert!(!is_valid_prefix("Fleet"));
    }
}
