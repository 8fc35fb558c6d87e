//! Shared formatting utilities used by both CLI and TUI
//!
//! Label derivations for node rows live here so the `list` command and the
//! interactive table render identical strings.

use crate::models::Node;

/// Truncate a string to a maximum length (in characters), adding "..." at the end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
///
/// # Examples
/// ```
/// use nodeman::formatting::truncate_string;
/// assert_eq!(truncate_string("hello", 10), "hello");
/// assert_eq!(truncate_string("hello world", 8), "hello...");
/// assert_eq!(truncate_string("ab", 2), "ab");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Build the services label for a node.
///
/// Each service contributes one `"<cluster>-<service>"` entry per cluster name,
/// in service order then cluster order, joined with `", "`. A missing node or a
/// node without services yields an empty string.
///
/// # Examples
/// ```
/// use nodeman::formatting::service_names_label;
/// use nodeman::models::{Node, Service};
///
/// let mut node = Node::named("n1");
/// node.services.push(Service {
///     name: "zk".to_string(),
///     cluster_names: vec!["c1".to_string(), "c2".to_string()],
/// });
/// assert_eq!(service_names_label(Some(&node)), "c1-zk, c2-zk");
/// assert_eq!(service_names_label(None), "");
/// ```
#[must_use]
pub fn service_names_label(node: Option<&Node>) -> String {
    let Some(node) = node else {
        return String::new();
    };

    node.services
        .iter()
        .flat_map(|service| {
            service
                .cluster_names
                .iter()
                .map(move |cluster| format!("{}-{}", cluster, service.name))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the SSH label from optional user and port.
///
/// A port of `0` is present. A user that is empty or whitespace is absent.
///
/// # Examples
/// ```
/// use nodeman::formatting::ssh_label;
/// assert_eq!(ssh_label(Some("admin"), Some(22)), "user: admin, port: 22");
/// assert_eq!(ssh_label(Some("admin"), None), "user: admin");
/// assert_eq!(ssh_label(None, Some(22)), "port: 22");
/// assert_eq!(ssh_label(None, None), "");
/// ```
#[must_use]
pub fn ssh_label(user: Option<&str>, port: Option<u16>) -> String {
    let user = user.filter(|u| !u.trim().is_empty());
    match (user, port) {
        (Some(user), Some(port)) => format!("user: {}, port: {}", user, port),
        (Some(user), None) => format!("user: {}", user),
        (None, Some(port)) => format!("port: {}", port),
        (None, None) => String::new(),
    }
}

/// SSH label for a node
#[must_use]
pub fn node_ssh_label(node: &Node) -> String {
    ssh_label(node.user.as_deref(), node.port)
}

/// Format an optional local timestamp for display
#[must_use]
pub fn format_timestamp(ts: Option<chrono::DateTime<chrono::Local>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
