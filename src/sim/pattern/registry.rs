//! Lookup of measured patterns by antenna type and frequency band.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::RadiationPattern;

/// Band labels that refer to the same pattern file.
const BAND_ALIASES: &[(&str, &str)] = &[
    ("700-900", "738-921"),
    ("1400-2600", "1427-2570"),
    ("1800-2600", "1427-2570"),
];

/// Normalized (antenna type, frequency band) key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey {
    antenna_type: String,
    band: String,
}

impl PatternKey {
    /// Builds a key, ignoring case and whitespace and resolving band aliases.
    pub fn new(antenna_type: &str, band: &str) -> Self {
        let band = squash(band);
        let band = BAND_ALIASES
            .iter()
            .find(|(alias, _)| *alias == band)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(band);
        Self {
            antenna_type: squash(antenna_type),
            band,
        }
    }

    pub fn antenna_type(&self) -> &str {
        &self.antenna_type
    }

    pub fn band(&self) -> &str {
        &self.band
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.antenna_type, self.band)
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Measured patterns, built once before a run and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: HashMap<PatternKey, Arc<RadiationPattern>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pattern. Returns the pattern previously stored under the same key.
    pub fn insert(
        &mut self,
        key: PatternKey,
        pattern: RadiationPattern,
    ) -> Option<Arc<RadiationPattern>> {
        self.patterns.insert(key, Arc::new(pattern))
    }

    pub fn get(&self, key: &PatternKey) -> Option<Arc<RadiationPattern>> {
        self.patterns.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
