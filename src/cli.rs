//! Command-line interface for metamatch.
//!
//! `fetch` retrieves a node (or the whole file) from Figma and stores a style
//! snapshot; `process` turns a node snapshot into one CSS file per node. All
//! pipeline logic lives in `metamatch-core`; this module wires configuration,
//! the HTTP client and output reporting together.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metamatch_core::contract::DocumentSource;
use metamatch_core::storage::StorageManager;
use metamatch_core::{fetch_file_nodes, find_style_snapshot, process_styles};
use tracing::{error, info};

use crate::figma_client::FigmaClient;
use crate::load_config::{load_config, load_figma_settings};

/// Extract Figma node styles and generate CSS.
#[derive(Parser)]
#[clap(
    name = "metamatch",
    version,
    about = "Extract Figma node styles into JSON snapshots and generate one CSS file per node"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a node (or the whole file) from Figma and save a style snapshot
    Fetch {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Node id such as 12:34 or 12-34; defaults to the node-id of FIGMA_FILE_URL
        node_id: Option<String>,
    },
    /// Generate CSS files from a node style snapshot
    Process {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Snapshot to read; defaults to the most recent node snapshot in the data directory
        #[clap(long)]
        input: Option<PathBuf>,
        /// Output base directory; defaults to css_dir from the config
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

/// Async CLI entrypoint shared by `main` and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch { config, node_id } => {
            let config = load_config(config.as_deref())?;
            let settings = load_figma_settings()?;
            info!(
                command = "fetch",
                file_url = %settings.file_url,
                file_id = %settings.file_id,
                "Starting fetch"
            );

            let client = FigmaClient::with_base_url(
                &settings.token,
                &config.api_base_url,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            client
                .validate_token()
                .await
                .context("Figma access token was rejected")?;

            let storage = StorageManager::new(&config.data_dir)
                .with_max_snapshot_bytes(config.snapshot_limit());
            let node_id = node_id.or(settings.url_node_id);
            let report = fetch_file_nodes(&client, &storage, &settings.file_id, node_id.as_deref())
                .await
                .map_err(|e| {
                    error!(command = "fetch", error = %e, "Fetch failed");
                    e
                })?;

            println!("Fetched {} ({} nodes)", report.name, report.node_count);
            println!("File URL: {}", settings.file_url);
            println!("Snapshot: {}", report.snapshot_path.display());
            println!("Data directory: {}", storage.output_dir().display());
            Ok(())
        }
        Commands::Process { config, input, output } => {
            let config = load_config(config.as_deref())?;
            let input = match input {
                Some(path) => path,
                None => find_style_snapshot(&config.data_dir)?,
            };
            let output = output.unwrap_or(config.css_dir);
            info!(
                command = "process",
                input = %input.display(),
                output = %output.display(),
                "Starting CSS generation"
            );

            let report = process_styles(&input, &output).map_err(|e| {
                error!(command = "process", error = %e, "CSS generation failed");
                e
            })?;

            println!(
                "Generated {} CSS files for {} nodes in {}",
                report.written.len(),
                report.record_count,
                output.display()
            );
            for (root_id, count) in &report.groups {
                println!("  {root_id}: {count} nodes");
            }
            Ok(())
        }
    }
}
