//! # figma_client: HTTP implementation of [`DocumentSource`]
//!
//! Talks to the Figma REST API with a personal access token sent as
//! `X-Figma-Token`. Non-success responses are mapped to a [`FigmaApiError`]
//! carrying the HTTP status and a message a user can act on.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use metamatch_core::contract::{DocumentSource, FigmaFileResponse, FileOptions};
use metamatch_core::error::FigmaApiError;
use metamatch_core::node::from_json_str;
use metamatch_core::Node;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

pub const FIGMA_API_BASE_URL: &str = "https://api.figma.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    err: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    document: Node,
}

#[derive(Debug, Deserialize)]
struct NodesResponse {
    #[serde(default)]
    nodes: HashMap<String, Option<NodeEntry>>,
}

/// User-facing message for a non-success status. `err` is the `err` field of
/// the response body, used only for statuses without a dedicated message.
pub fn status_message(status: u16, err: Option<&str>) -> String {
    match status {
        400 => "Bad request parameters".to_string(),
        401 => "Personal access token is invalid or expired, check the configuration".to_string(),
        403 => "No permission to access this file, check its sharing settings".to_string(),
        404 => "File not found or deleted".to_string(),
        429 => "Figma API rate limit exceeded, retry later".to_string(),
        500 | 502 | 503 => "Figma server error, retry later".to_string(),
        _ => match err {
            Some(err) => format!("Figma API error ({status}): {err}"),
            None => format!("Figma API error ({status})"),
        },
    }
}

pub struct FigmaClient {
    http: Client,
    base_url: String,
}

impl FigmaClient {
    pub fn new(token: &str) -> Result<Self, FigmaApiError> {
        Self::with_base_url(token, FIGMA_API_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(
        token: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FigmaApiError> {
        let mut token_value = HeaderValue::from_str(token).map_err(|e| {
            FigmaApiError::new(format!("Access token is not a valid header value: {e}"))
        })?;
        token_value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("X-Figma-Token", token_value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FigmaApiError::new(format!("Failed to build HTTP client: {e}")))?;

        info!(base_url, timeout_secs = timeout.as_secs(), "Initialized Figma client");
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FigmaApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Sending request");

        let response = self.http.get(&url).query(query).send().await.map_err(|e| {
            error!(error = %e, url = %url, "Request failed");
            if e.is_timeout() {
                FigmaApiError::new(format!("Request timed out: {url}"))
            } else {
                FigmaApiError::new(format!("Network request failed, check the connection: {e}"))
            }
        })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Received response");
        let body = response
            .text()
            .await
            .map_err(|e| FigmaApiError::new(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let err = serde_json::from_str::<ErrorBody>(&body).ok().and_then(|b| b.err);
            let message = status_message(status.as_u16(), err.as_deref());
            error!(
                status = status.as_u16(),
                url = %url,
                "Figma API returned error. Response body: {body}"
            );
            return Err(FigmaApiError::with_status(message, status.as_u16()));
        }

        from_json_str(&body).map_err(|e| {
            error!(error = %e, url = %url, "Failed to decode response");
            FigmaApiError::new(format!("Failed to decode Figma response: {e}"))
        })
    }
}

#[async_trait]
impl DocumentSource for FigmaClient {
    async fn get_file(
        &self,
        file_id: &str,
        options: FileOptions,
    ) -> Result<FigmaFileResponse, FigmaApiError> {
        info!(file_id, "Fetching Figma file");
        let mut query = Vec::new();
        if let Some(depth) = options.depth {
            query.push(("depth", depth.to_string()));
        }
        if let Some(geometry) = options.geometry {
            query.push(("geometry", if geometry { "paths" } else { "none" }.to_string()));
        }
        let file: FigmaFileResponse = self.get_json(&format!("/files/{file_id}"), &query).await?;
        info!(file_id, name = %file.name, "Fetched Figma file");
        Ok(file)
    }

    async fn get_node(&self, file_id: &str, node_id: &str) -> Result<Node, FigmaApiError> {
        info!(file_id, node_id, "Fetching Figma node");
        let response: NodesResponse = self
            .get_json(&format!("/files/{file_id}/nodes"), &[("ids", node_id.to_string())])
            .await?;
        let node = response
            .nodes
            .into_iter()
            .find(|(id, _)| id == node_id)
            .and_then(|(_, entry)| entry)
            .map(|entry| entry.document)
            .ok_or_else(|| {
                error!(file_id, node_id, "Node missing from response");
                FigmaApiError::new(format!("Node {node_id} does not exist"))
            })?;
        info!(node_id, name = ?node.name, "Fetched Figma node");
        Ok(node)
    }

    async fn validate_token(&self) -> Result<(), FigmaApiError> {
        info!("Validating Figma access token");
        self.get_json::<serde_json::Value>("/me", &[]).await?;
        info!("Access token accepted");
        Ok(())
    }
}
