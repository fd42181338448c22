//! Data models for the metric aggregate.
//!
//! The aggregate document is the canonical JSON file that collects every
//! joined metric under a single `metrics` mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat `entity -> value` mapping loaded verbatim from a metric file.
///
/// Key order follows the source file.
pub type RawMetricSource = Map<String, Value>;

/// One `{name, value}` pair derived from a source mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    /// Key from the source mapping, usually a repository identifier.
    pub name: String,
    /// Value from the source mapping, passed through unchanged.
    pub value: Value,
}

impl MetricEntry {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The canonical aggregate document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateDocument {
    /// Metric name -> entries derived from exactly one source mapping.
    /// Names keep the order they were first joined in.
    pub metrics: IndexMap<String, Vec<MetricEntry>>,

    /// Any other top-level keys, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AggregateDocument {
    /// The document written when no aggregate exists yet: `{"metrics": {}}`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries registered under `name`, if any.
    #[cfg(test)]
    pub fn metric(&self, name: &str) -> Option<&[MetricEntry]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    /// Names of all registered metrics.
    #[cfg(test)]
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.keys().map(String::as_str).collect()
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Per-metric entry counts, for listing.
    pub fn summaries(&self) -> Vec<MetricSummary> {
        self.metrics
            .iter()
            .map(|(name, entries)| MetricSummary {
                name: name.clone(),
                entries: entries.len(),
            })
            .collect()
    }
}

/// Name and size of one registered metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSummary {
    pub name: String,
    pub entries: usize,
}
