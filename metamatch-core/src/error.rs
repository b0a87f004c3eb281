//! Error types shared across the metamatch pipeline.
//!
//! Each stage owns one error enum. Unsupported paint kinds and unknown alignment
//! keywords are not errors: they are dropped during CSS generation.

use std::path::PathBuf;

/// Malformed input handed to the flattener.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document has no `styles` node to start flattening from.
    #[error("JSON data does not contain styles property")]
    MissingStyles,
    /// The `styles` node exists but has no `id`, so descendants cannot be tagged with a root.
    #[error("styles root node has no id")]
    MissingRootId,
    #[error("failed to parse style document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while creating a directory or writing one CSS file.
#[derive(Debug, thiserror::Error)]
#[error("failed to write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Failure while persisting or loading style snapshots.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse snapshot {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The whole-file snapshot exceeded the configured byte limit.
    #[error(
        "file snapshot exceeds the {limit} byte limit; \
         fetch a specific node id instead of the whole file"
    )]
    SnapshotTooLarge { limit: usize },
}

/// Invalid token, file URL or node id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Figma personal access token is not configured or empty")]
    MissingToken,
    #[error("Figma personal access token must start with \"figd_\"")]
    TokenPrefix,
    #[error("Figma personal access token is too short")]
    TokenTooShort,
    #[error("Figma file URL is not configured or empty")]
    MissingFileUrl,
    #[error(
        "Figma file URL is malformed, \
         expected https://www.figma.com/file/{{fileId}}/{{fileName}}: {0}"
    )]
    MalformedFileUrl(String),
    #[error("node id is malformed: {0}")]
    MalformedNodeId(String),
}

/// Failure reported by a [`DocumentSource`](crate::contract::DocumentSource).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FigmaApiError {
    pub message: String,
    /// HTTP status when the failure came from a response.
    pub status: Option<u16>,
}

impl FigmaApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Errors from the snapshot → CSS pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no figma-node-styles-*.json snapshot found in {0}")]
    NoSnapshot(PathBuf),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Errors from the retrieve → extract → store flow.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] FigmaApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
