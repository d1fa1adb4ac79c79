use crate::utils::error::{GramsError, Result};
use crate::utils::validation::validate_positive_finite;
use std::collections::HashMap;

pub const DEFAULT_KEY: &str = "default";

// g/cm³, bulk density as served
const BUILTIN_DENSITIES: &[(&str, f64)] = &[
    (DEFAULT_KEY, 1.0),
    ("apple", 0.8),
    ("banana", 0.94),
    ("bread", 0.3),
    ("buckwheat", 0.75),
    ("cake", 0.6),
    ("carrot", 1.04),
    ("cheese", 1.1),
    ("chicken", 1.05),
    ("cucumber", 0.96),
    ("egg", 1.03),
    ("fish", 1.05),
    ("meat", 1.06),
    ("orange", 0.87),
    ("pasta", 0.95),
    ("porridge", 1.05),
    ("potato", 1.08),
    ("rice", 0.85),
    ("salad", 0.35),
    ("soup", 1.0),
    ("tomato", 0.95),
];

/// Food label to density lookup with a mandatory fallback entry.
///
/// Loaded once and shared read-only behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityTable {
    entries: HashMap<String, f64>,
    default: f64,
}

impl DensityTable {
    pub fn new(entries: HashMap<String, f64>) -> Result<Self> {
        let default = *entries
            .get(DEFAULT_KEY)
            .ok_or_else(|| GramsError::MissingConfig {
                field: format!("density.{}", DEFAULT_KEY),
            })?;

        for (label, density) in &entries {
            validate_positive_finite(&format!("density.{}", label), *density)?;
        }

        Ok(Self { entries, default })
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_DENSITIES
            .iter()
            .map(|(label, density)| (label.to_string(), *density))
            .collect();
        Self {
            entries,
            default: 1.0,
        }
    }

    /// Density for `label`, falling back to the `default` entry. Labels are
    /// matched case-sensitively.
    pub fn density_for(&self, label: &str) -> f64 {
        self.entries.get(label).copied().unwrap_or(self.default)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self::builtin()
    }
}
