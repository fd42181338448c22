//! Metric name derivation.

use crate::error::{JoinError, Result};

/// Default suffix of metric source files.
pub const DEFAULT_EXTENSION: &str = ".json";

/// Derive a metric name from a file path: last segment, `extension` removed.
///
/// Both `/` and `\` count as separators. A segment without the suffix is
/// returned as-is.
pub fn derive_metric_name(path: &str, extension: &str) -> Result<String> {
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let name = segment.strip_suffix(extension).unwrap_or(segment);

    if name.is_empty() {
        return Err(JoinError::InvalidInput(format!(
            "cannot derive a metric name from '{}'",
            path
        )));
    }

    Ok(name.to_string())
}

/// Whether a directory entry name looks like a metric source file.
pub fn is_metric_file(file_name: &str, extension: &str) -> bool {
    file_name.len() > extension.len() && file_name.ends_with(extension)
}
