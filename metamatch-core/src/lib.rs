#![doc = "metamatch-core: style extraction and CSS generation for Figma documents."]

//! The pipeline has two halves:
//!
//! - retrieval: a [`contract::DocumentSource`] returns a document tree,
//!   [`extract`] normalizes its styles and [`storage`] saves a JSON snapshot;
//! - generation: [`flatten`] turns a snapshot into per-node records grouped by
//!   root, [`css`] maps each record's styles to declarations and [`output`]
//!   writes one CSS file per node.
//!
//! [`fetch`] and [`pipeline`] drive the two halves end to end. Nothing here
//! performs network I/O; the HTTP client lives in the `metamatch` crate.

pub mod contract;
pub mod css;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod flatten;
pub mod node;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod validate;

pub use error::{FetchError, ParseError, ProcessError, StorageError, ValidationError, WriteError};
pub use fetch::{fetch_file_nodes, FetchReport};
pub use node::Node;
pub use pipeline::{find_style_snapshot, process_styles, ProcessReport};
