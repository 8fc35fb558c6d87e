//! Client for the node API
//!
//! This module provides the `NodeApi` trait used by the TUI and CLI, and
//! `HttpNodeApi`, its implementation over `reqwest`. Endpoints:
//! - `GET  {base}/api/nodes`          list nodes
//! - `POST {base}/api/nodes`          create a node
//! - `PUT  {base}/api/nodes/{name}`   update a node

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::formatting::truncate_string;
use crate::models::{ApiConfig, Node, NodeDraft, NodeListResponse};

/// Maximum number of characters of an error body kept in `ApiError::Status`
const ERROR_BODY_MAX_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Operations on the node registry
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// List all registered nodes
    async fn fetch_nodes(&self) -> Result<NodeListResponse>;

    /// Register a new node
    async fn create_node(&self, draft: &NodeDraft) -> Result<Node>;

    /// Update the node called `name`
    async fn update_node(&self, name: &str, draft: &NodeDraft) -> Result<Node>;
}

/// `NodeApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpNodeApi {
    base: Url,
    client: reqwest::Client,
}

impl HttpNodeApi {
    /// Build a client from API settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { base, client })
    }

    /// Base URL the client talks to
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `{base}/api/nodes[/segment...]`, percent-encoding each segment
    fn endpoint(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", "nodes"])
            .extend(extra);
        Ok(url)
    }

    /// Turn a non-2xx response into `ApiError::Status`, otherwise return the body
    async fn read_body(response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                body: truncate_string(body.trim(), ERROR_BODY_MAX_LEN),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl NodeApi for HttpNodeApi {
    async fn fetch_nodes(&self) -> Result<NodeListResponse> {
        let url = self.endpoint(&[])?;
        tracing::debug!(%url, "fetching nodes");

        let response = self.client.get(url).send().await?;
        let body = Self::read_body(response).await?;
        Ok(NodeListResponse::from_json(&body)?)
    }

    async fn create_node(&self, draft: &NodeDraft) -> Result<Node> {
        let url = self.endpoint(&[])?;
        tracing::debug!(%url, name = %draft.name, "creating node");

        let response = self.client.post(url).json(draft).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn update_node(&self, name: &str, draft: &NodeDraft) -> Result<Node> {
        let url = self.endpoint(&[name])?;
        tracing::debug!(%url, name, "updating node");

        let response = self.client.put(url).json(draft).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
