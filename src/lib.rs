#![doc = "metamatch: CLI and Figma HTTP client on top of metamatch-core."]

pub mod cli;
pub mod figma_client;
pub mod load_config;

pub use cli::{run, Cli, Commands};
