//! # contract: interface to a remote design-document service
//!
//! [`DocumentSource`] is the seam between the retrieval flow in
//! [`crate::fetch`] and whatever serves Figma documents. The root crate
//! implements it over HTTP; tests use the generated `MockDocumentSource`.
//!
//! The trait is annotated for `mockall`; the mock is exported under the
//! `test-export-mocks` feature so integration tests of dependent crates can use it.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FigmaApiError;
use crate::node::Node;
use crate::storage::FileMetadata;

/// Whole-file response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaFileResponse {
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub version: String,
    pub document: Node,
    #[serde(default)]
    pub components: Option<Map<String, Value>>,
    #[serde(default)]
    pub styles: Option<Map<String, Value>>,
    #[serde(default)]
    pub schema_version: Option<u32>,
}

impl FigmaFileResponse {
    /// Snapshot metadata for this file, stamped with the current time.
    pub fn metadata(&self, file_id: &str) -> FileMetadata {
        FileMetadata {
            file_id: file_id.to_string(),
            file_name: self.name.clone(),
            last_modified: self.last_modified.clone(),
            version: self.version.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Query options for whole-file retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Maximum tree depth to return.
    pub depth: Option<u32>,
    /// `Some(true)` requests vector paths, `Some(false)` explicitly omits them.
    pub geometry: Option<bool>,
}

/// Read access to Figma documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Retrieve the whole file, including its component and style dictionaries.
    async fn get_file(
        &self,
        file_id: &str,
        options: FileOptions,
    ) -> Result<FigmaFileResponse, FigmaApiError>;

    /// Retrieve the subtree rooted at one node.
    async fn get_node(&self, file_id: &str, node_id: &str) -> Result<Node, FigmaApiError>;

    /// Check that the configured credentials are accepted.
    async fn validate_token(&self) -> Result<(), FigmaApiError>;
}
