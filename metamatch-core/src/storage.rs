//! Snapshot persistence for extracted styles.
//!
//! Node snapshots are pretty-printed; whole-file snapshots are written compact
//! and streamed through a byte budget so an oversized document fails with
//! [`StorageError::SnapshotTooLarge`] instead of exhausting memory or disk.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::StorageError;
use crate::extract::{FileStyles, NodeStyleInfo};
use crate::node::from_json_str;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 512 * 1024 * 1024;

/// Provenance stored alongside every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_id: String,
    pub file_name: String,
    pub last_modified: String,
    pub version: String,
    pub thumbnail_url: String,
    pub fetched_at: String,
}

#[derive(Serialize)]
struct NodeSnapshot<'s, 'a> {
    metadata: &'s FileMetadata,
    styles: &'s NodeStyleInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileSnapshot<'s, 'a> {
    metadata: &'s FileMetadata,
    styles: &'s NodeStyleInfo<'a>,
    figma_components: &'s Map<String, Value>,
    figma_styles: &'s Map<String, Value>,
}

/// Refuses writes past `limit` bytes and remembers that it did.
struct LimitedWriter<W> {
    inner: W,
    written: usize,
    limit: usize,
    exceeded: bool,
}

impl<W: Write> Write for LimitedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.saturating_add(buf.len()) > self.limit {
            self.exceeded = true;
            return Err(io::Error::new(io::ErrorKind::Other, "snapshot byte limit exceeded"));
        }
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Debug, Clone)]
pub struct StorageManager {
    output_dir: PathBuf,
    max_snapshot_bytes: usize,
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StorageManager {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }

    pub fn with_max_snapshot_bytes(mut self, limit: usize) -> Self {
        self.max_snapshot_bytes = limit;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn initialize(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| {
            error!(
                error = ?source,
                path = %self.output_dir.display(),
                "Failed to create storage directory"
            );
            StorageError::Io {
                path: self.output_dir.clone(),
                source,
            }
        })?;
        info!(path = %self.output_dir.display(), "Storage directory ready");
        Ok(())
    }

    /// Writes `figma-node-styles-<file>-<node>-<millis>.json`, pretty-printed.
    pub fn save_node_styles(
        &self,
        metadata: &FileMetadata,
        styles: &NodeStyleInfo<'_>,
    ) -> Result<PathBuf, StorageError> {
        let node_id = styles.id.as_deref().unwrap_or_default().replace(['/', ':'], "-");
        let file_name = format!(
            "figma-node-styles-{}-{}-{}.json",
            metadata.file_id,
            node_id,
            Utc::now().timestamp_millis()
        );
        let path = self.output_dir.join(file_name);

        let json = serde_json::to_string_pretty(&NodeSnapshot { metadata, styles })
            .map_err(StorageError::Serialize)?;
        fs::write(&path, json).map_err(|source| {
            error!(error = ?source, path = %path.display(), "Failed to write node snapshot");
            StorageError::Io {
                path: path.clone(),
                source,
            }
        })?;

        info!(path = %path.display(), "Saved node snapshot");
        Ok(path)
    }

    /// Writes `figma-styles-<file>-<millis>.json`, compact, within the byte budget.
    /// A partially written file is removed when the budget is exceeded.
    pub fn save_file_styles(
        &self,
        metadata: &FileMetadata,
        file: &FileStyles<'_>,
    ) -> Result<PathBuf, StorageError> {
        let file_name = format!(
            "figma-styles-{}-{}.json",
            metadata.file_id,
            Utc::now().timestamp_millis()
        );
        let path = self.output_dir.join(file_name);
        let io_error = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        info!(path = %path.display(), "Saving file snapshot, large documents may take a while");
        let handle = File::create(&path).map_err(io_error)?;
        let mut writer = LimitedWriter {
            inner: BufWriter::new(handle),
            written: 0,
            limit: self.max_snapshot_bytes,
            exceeded: false,
        };

        let snapshot = FileSnapshot {
            metadata,
            styles: &file.document_styles,
            figma_components: &file.components,
            figma_styles: &file.styles,
        };
        let mut result = serde_json::to_writer(&mut writer, &snapshot).map_err(|e| {
            if writer.exceeded {
                StorageError::SnapshotTooLarge {
                    limit: self.max_snapshot_bytes,
                }
            } else {
                StorageError::Serialize(e)
            }
        });
        if result.is_ok() {
            result = writer.flush().map_err(io_error);
        }

        if let Err(e) = result {
            error!(error = %e, path = %path.display(), "Failed to save file snapshot");
            drop(writer);
            if let Err(remove_err) = fs::remove_file(&path) {
                warn!(
                    error = ?remove_err,
                    path = %path.display(),
                    "Failed to remove partial snapshot"
                );
            }
            return Err(e);
        }

        let size_mb = writer.written as f64 / 1024.0 / 1024.0;
        info!(path = %path.display(), size_mb = %format!("{size_mb:.2}"), "Saved file snapshot");
        Ok(path)
    }

    pub fn load_data(&self, path: &Path) -> Result<Value, StorageError> {
        let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        from_json_str(&content).map_err(|source| StorageError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of the `.json` files in the storage directory, sorted. A missing
    /// directory yields an empty list.
    pub fn list_saved_files(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.output_dir.display(), "Storage directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.output_dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.output_dir.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
