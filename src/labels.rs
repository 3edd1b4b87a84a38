//! Label file loading

use crate::error::{GlyphMillError, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Characters a label may not contain: path separators, since labels name
/// files and folders, and the manifest's comma separator
pub fn is_reserved_label_char(c: char) -> bool {
    matches!(c, '/' | '\\' | ',')
}

/// Read newline-delimited labels, keeping file order.
///
/// Blank lines are skipped. A label containing a path separator or a comma
/// is rejected.
pub fn read_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        GlyphMillError::label_file(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_labels(&content)
}

/// Parse label file content; see [`read_labels`]
pub fn parse_labels(content: &str) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let label = line.trim_end_matches('\r');
        if label.trim().is_empty() {
            warn!(line = idx + 1, "skipping blank label");
            continue;
        }
        if label.contains(is_reserved_label_char) {
            return Err(GlyphMillError::label_file(format!(
                "line {}: label {:?} contains a path separator or comma",
                idx + 1,
                label
            )));
        }
        labels.push(label.to_string());
    }
    Ok(labels)
}
