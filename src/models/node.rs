//! Node types for the node API.
//!
//! This module contains the data structures exchanged with the node endpoint:
//! the registered host (`Node`), the services attached to it, the list response
//! and the create/update request body.

use serde::{Deserialize, Serialize};

/// A service running on a node, grouped by the clusters that use it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,

    #[serde(default)]
    pub cluster_names: Vec<String>,
}

/// A managed host as returned by `GET /api/nodes`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Host name, unique within a listing
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Never rendered
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub services: Vec<Service>,

    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl Node {
    /// Create a node with only a name set
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: None,
            port: None,
            password: None,
            services: Vec::new(),
            last_modified: None,
        }
    }

    /// Number of (cluster, service) pairs hosted on this node
    #[must_use]
    pub fn service_instance_count(&self) -> usize {
        self.services.iter().map(|s| s.cluster_names.len()).sum()
    }

    /// Last modification time in local time, if the API reported one
    #[must_use]
    pub fn last_modified_local(&self) -> Option<chrono::DateTime<chrono::Local>> {
        use chrono::TimeZone;
        self.last_modified
            .and_then(|ms| chrono::Local.timestamp_millis_opt(ms).single())
    }
}

/// Result of listing nodes.
///
/// `result` is `None` when the server answered with `null` or an envelope
/// without a result. That is not an error: the page keeps its current table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeListResponse {
    pub result: Option<Vec<Node>>,
}

/// Accepted wire shapes for the list endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeListBody {
    Bare(Vec<Node>),
    Envelope {
        #[serde(default)]
        result: Option<Vec<Node>>,
    },
}

impl NodeListResponse {
    /// Parse a list response body.
    ///
    /// Accepts a bare JSON array, an envelope `{"result": [...]}`, `{"result": null}`,
    /// `{}` or `null`. Anything else is a schema violation and returns an error.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let parsed: Option<NodeListBody> = serde_json::from_slice(body)?;
        let result = match parsed {
            Some(NodeListBody::Bare(nodes)) => Some(nodes),
            Some(NodeListBody::Envelope { result }) => result,
            None => None,
        };
        Ok(Self { result })
    }
}

/// Request body for creating or updating a node
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeDraft {
    pub name: String,
    pub port: u16,
    pub user: String,

    /// Omitted on update to keep the stored password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
