//! Retrieve → extract → store.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info};

use crate::contract::{DocumentSource, FileOptions};
use crate::error::FetchError;
use crate::extract::{extract_file_styles, extract_node_styles};
use crate::storage::{FileMetadata, StorageManager};
use crate::validate::validate_node_id;

/// What a fetch retrieved and where it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub file_id: String,
    /// Normalized node id, or `None` for a whole-file fetch.
    pub node_id: Option<String>,
    pub name: String,
    pub node_type: Option<String>,
    /// Nodes in the retrieved tree, root included.
    pub node_count: usize,
    pub snapshot_path: PathBuf,
}

/// Fetches one node when `node_id` is given, otherwise the whole file, and
/// saves the extracted styles as a snapshot in `storage`.
pub async fn fetch_file_nodes<S>(
    source: &S,
    storage: &StorageManager,
    file_id: &str,
    node_id: Option<&str>,
) -> Result<FetchReport, FetchError>
where
    S: DocumentSource + ?Sized,
{
    let node_id = validate_node_id(node_id).map_err(|e| {
        error!(error = %e, "Invalid node id");
        e
    })?;
    storage.initialize()?;

    match node_id {
        Some(node_id) => {
            info!(file_id, node_id = %node_id, "Fetching node");
            let node = source.get_node(file_id, &node_id).await.map_err(|e| {
                error!(
                    error = %e,
                    status = ?e.status,
                    file_id,
                    node_id = %node_id,
                    "Failed to fetch node"
                );
                e
            })?;

            info!(node_id = %node_id, "Extracting node styles");
            let styles = extract_node_styles(&node);
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let metadata = FileMetadata {
                file_id: file_id.to_string(),
                file_name: node.name.clone().unwrap_or_default(),
                last_modified: now.clone(),
                version: "unknown".to_string(),
                thumbnail_url: String::new(),
                fetched_at: now,
            };
            let snapshot_path = storage.save_node_styles(&metadata, &styles)?;

            let report = FetchReport {
                file_id: file_id.to_string(),
                node_id: Some(node_id),
                name: metadata.file_name,
                node_type: node.node_type.clone(),
                node_count: node.subtree_len(),
                snapshot_path,
            };
            info!(
                name = %report.name,
                node_type = ?report.node_type,
                nodes = report.node_count,
                path = %report.snapshot_path.display(),
                "Node styles fetched"
            );
            Ok(report)
        }
        None => {
            info!(file_id, "Fetching whole file");
            let file = source.get_file(file_id, FileOptions::default()).await.map_err(|e| {
                error!(error = %e, status = ?e.status, file_id, "Failed to fetch file");
                e
            })?;

            info!(file_id, "Extracting file styles");
            let styles = extract_file_styles(
                &file.document,
                file.components.as_ref(),
                file.styles.as_ref(),
            );
            let metadata = file.metadata(file_id);
            let snapshot_path = storage.save_file_styles(&metadata, &styles)?;

            let report = FetchReport {
                file_id: file_id.to_string(),
                node_id: None,
                name: file.name.clone(),
                node_type: file.document.node_type.clone(),
                node_count: file.document.subtree_len(),
                snapshot_path,
            };
            info!(
                name = %report.name,
                last_modified = %file.last_modified,
                version = %file.version,
                nodes = report.node_count,
                path = %report.snapshot_path.display(),
                "File styles fetched"
            );
            Ok(report)
        }
    }
}
