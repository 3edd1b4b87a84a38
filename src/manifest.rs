//! Append-only `label,path` manifest

use crate::config::MANIFEST_FILE_NAME;
use crate::error::{GlyphMillError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub label: String,
    pub path: PathBuf,
}

/// Writes `label,path` rows in generation order, no header.
///
/// Rows are buffered; the buffer is flushed by [`ManifestWriter::finish`] or
/// when the writer is dropped.
pub struct ManifestWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
}

impl ManifestWriter {
    /// Create (or truncate) the manifest inside `output_dir`
    pub fn create(output_dir: impl AsRef<Path>) -> Result<Self> {
        let path = output_dir.as_ref().join(MANIFEST_FILE_NAME);
        let file = File::create(&path).map_err(|e| {
            GlyphMillError::with_context(format!("creating manifest {}", path.display()), e)
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Append a row for an image that has already been written
    pub fn append(&mut self, label: &str, image_path: &Path) -> Result<()> {
        writeln!(self.writer, "{},{}", label, image_path.display())?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows and close the file
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

/// Parse a manifest back into entries.
///
/// The label is everything before the first comma, so paths may contain commas.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>> {
    let content = fs::read_to_string(path.as_ref())?;
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let (label, image) = line.split_once(',').ok_or_else(|| {
                GlyphMillError::Serialization(format!("manifest line {} has no comma", idx + 1))
            })?;
            Ok(ManifestEntry {
                label: label.to_string(),
                path: PathBuf::from(image),
            })
        })
        .collect()
}
