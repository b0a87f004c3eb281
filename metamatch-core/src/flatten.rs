//! Flattening of a style snapshot into per-node records, grouped by root.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ParseError;
use crate::node::{from_json_str, Node};

/// A parsed style document: anything exposing a `styles` node at the top level.
///
/// Snapshots written by [`StorageManager`](crate::storage::StorageManager) have
/// this shape; `metadata` is kept for reporting only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleDocument {
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub styles: Option<Node>,
}

impl StyleDocument {
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(from_json_str(json)?)
    }
}

/// One flattened node, tagged with the id of the root it was reached from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRecord<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub root_id: &'a str,
    /// The originating node, borrowed from the document.
    pub styles: &'a Node,
}

/// Flattens the document's `styles` tree.
///
/// Fails without producing any record when the document has no `styles` node
/// or when that node has no id.
pub fn parse_style_nodes(document: &StyleDocument) -> Result<Vec<StyleRecord<'_>>, ParseError> {
    let Some(root) = document.styles.as_ref() else {
        error!("Style document has no styles property");
        return Err(ParseError::MissingStyles);
    };
    let Some(root_id) = root.id.as_deref() else {
        error!("Styles root node has no id");
        return Err(ParseError::MissingRootId);
    };
    let records = flatten_node(root, root_id);
    info!(root_id, records = records.len(), "Flattened style tree");
    Ok(records)
}

/// Pre-order flattening of `root`; every record carries `root_id`.
///
/// Nodes without an id or name are not recorded but their descendants are.
pub fn flatten_node<'a>(root: &'a Node, root_id: &'a str) -> Vec<StyleRecord<'a>> {
    let mut records = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match (node.id.as_deref(), node.name.as_deref()) {
            (Some(id), Some(name)) if node.has_identity() => records.push(StyleRecord {
                id,
                name,
                root_id,
                styles: node,
            }),
            _ => debug!(node_type = ?node.node_type, "Skipping node without id or name"),
        }
        stack.extend(node.children().iter().rev());
    }
    records
}

/// Partitions records by root id, keeping first-seen root order and record order within each root.
pub fn group_by_root_id<'a>(
    records: &[StyleRecord<'a>],
) -> IndexMap<&'a str, Vec<StyleRecord<'a>>> {
    let mut grouped: IndexMap<&'a str, Vec<StyleRecord<'a>>> = IndexMap::new();
    for record in records {
        grouped.entry(record.root_id).or_default().push(*record);
    }
    grouped
}
