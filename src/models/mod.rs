//! Data models for the node API and application configuration.

mod config;
mod node;

pub use config::{ApiConfig, Config, ConfigError, DisplayConfig, RefreshConfig};
pub use node::{Node, NodeDraft, NodeListResponse, Service};
