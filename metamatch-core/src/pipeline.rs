//! Snapshot → CSS files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::ProcessError;
use crate::flatten::{group_by_root_id, parse_style_nodes, StyleDocument};
use crate::output::create_css_files;

pub const NODE_SNAPSHOT_PREFIX: &str = "figma-node-styles-";

/// Outcome of one [`process_styles`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub record_count: usize,
    /// `(root id, record count)` in first-seen order.
    pub groups: Vec<(String, usize)>,
    pub written: Vec<PathBuf>,
}

/// Reads a style snapshot, flattens it and writes one CSS file per node
/// under `output_base_dir`.
pub fn process_styles(
    json_path: &Path,
    output_base_dir: &Path,
) -> Result<ProcessReport, ProcessError> {
    info!(path = %json_path.display(), "Reading style snapshot");
    let json = fs::read_to_string(json_path).map_err(|source| {
        error!(error = ?source, path = %json_path.display(), "Failed to read style snapshot");
        ProcessError::Io {
            path: json_path.to_path_buf(),
            source,
        }
    })?;

    let document = StyleDocument::from_json(&json).map_err(|e| {
        error!(error = %e, path = %json_path.display(), "Failed to parse style snapshot");
        e
    })?;

    info!("Flattening style tree");
    let records = parse_style_nodes(&document)?;

    let grouped = group_by_root_id(&records);
    for (root_id, group) in &grouped {
        debug!(root_id, records = group.len(), "Grouped records");
    }
    info!(groups = grouped.len(), "Grouped records by root");

    info!(base_dir = %output_base_dir.display(), "Writing CSS files");
    let mut written = Vec::with_capacity(records.len());
    for group in grouped.values() {
        written.extend(create_css_files(group, output_base_dir)?);
    }

    let report = ProcessReport {
        record_count: records.len(),
        groups: grouped
            .iter()
            .map(|(root_id, group)| (root_id.to_string(), group.len()))
            .collect(),
        written,
    };
    info!(
        records = report.record_count,
        files = report.written.len(),
        "CSS generation complete"
    );
    Ok(report)
}

/// Millisecond timestamp that ends a snapshot file name; 0 when there is none.
fn snapshot_timestamp(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|millis| millis.parse().ok())
        .unwrap_or(0)
}

/// Most recent node snapshot in `data_dir`, by the timestamp in its file name.
pub fn find_style_snapshot(data_dir: &Path) -> Result<PathBuf, ProcessError> {
    let entries = fs::read_dir(data_dir).map_err(|source| ProcessError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ProcessError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(NODE_SNAPSHOT_PREFIX) && name.ends_with(".json") {
            candidates.push(entry.path());
        }
    }
    candidates.sort_by_key(|path| (snapshot_timestamp(path), path.clone()));

    candidates.pop().ok_or_else(|| {
        error!(path = %data_dir.display(), "No node style snapshot found");
        ProcessError::NoSnapshot(data_dir.to_path_buf())
    })
}
