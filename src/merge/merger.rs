//! Folding raw metric sources into the aggregate document.

use crate::error::{JoinError, Result};
use crate::models::{AggregateDocument, MetricEntry, RawMetricSource};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Register `raw` under `metric_name`, replacing any previous entries.
///
/// `raw` must be a JSON object; anything else is [`JoinError::InvalidInput`]
/// and leaves `document` untouched.
pub fn merge(document: &mut AggregateDocument, metric_name: &str, raw: &Value) -> Result<()> {
    let source = raw.as_object().ok_or_else(|| {
        JoinError::InvalidInput(format!(
            "metric '{}' must be a JSON object, got {}",
            metric_name,
            json_kind(raw)
        ))
    })?;

    merge_source(document, metric_name, source)
}

/// Register an already-typed source under `metric_name`.
///
/// Entries keep the source's key order. An empty source still registers
/// the metric, with no entries.
pub fn merge_source(
    document: &mut AggregateDocument,
    metric_name: &str,
    source: &RawMetricSource,
) -> Result<()> {
    if metric_name.is_empty() {
        return Err(JoinError::InvalidInput(
            "metric name must not be empty".to_string(),
        ));
    }

    let entries: Vec<MetricEntry> = source
        .iter()
        .map(|(name, value)| MetricEntry::new(name.clone(), value.clone()))
        .collect();

    if let Some(previous) = document.metrics.insert(metric_name.to_string(), entries) {
        debug!(
            "Replaced metric '{}' ({} previous entries)",
            metric_name,
            previous.len()
        );
    }

    Ok(())
}

/// Load a metric source file as raw JSON.
pub fn read_metric_source(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| JoinError::from_io(path, e))?;

    serde_json::from_str(&content).map_err(|source| JoinError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
