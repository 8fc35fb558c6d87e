//! Display and formatting functions for the non-interactive commands

use owo_colors::OwoColorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, Width, object::Rows},
};

use crate::formatting::{format_timestamp, node_ssh_label, service_names_label, truncate_string};
use crate::models::Node;

/// Table row for node display
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "HOST NAME")]
    name: String,

    #[tabled(rename = "SERVICES")]
    services: String,

    #[tabled(rename = "SSH")]
    ssh: String,

    #[tabled(rename = "MODIFIED")]
    modified: String,
}

/// Placeholder for empty cells
fn or_dash(value: String) -> String {
    if value.is_empty() {
        "-".bright_black().to_string()
    } else {
        value
    }
}

/// Render nodes as a table, in the order given
pub fn format_nodes(nodes: &[Node], name_max_length: usize) -> String {
    if nodes.is_empty() {
        return "No nodes found".yellow().to_string();
    }

    let rows: Vec<NodeRow> = nodes
        .iter()
        .map(|node| NodeRow {
            name: truncate_string(&node.name, name_max_length).bold().to_string(),
            services: or_dash(service_names_label(Some(node))),
            ssh: or_dash(node_ssh_label(node)),
            modified: format_timestamp(node.last_modified_local()),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Width::wrap(200).keep_words(true))
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// One-line confirmation after a create or update
pub fn format_saved(node: &Node, created: bool) -> String {
    let verb = if created { "Added" } else { "Updated" };
    let ssh = node_ssh_label(node);
    if ssh.is_empty() {
        format!("{} node {}", verb.green(), node.name.bold())
    } else {
        format!("{} node {} ({})", verb.green(), node.name.bold(), ssh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;

    #[test]
    fn test_format_nodes_empty() {
        assert!(format_nodes(&[], 30).contains("No nodes found"));
    }

    #[test]
    fn test_format_nodes_table() {
        let mut node = Node::named("node01");
        node.user = Some("ohara".to_string());
        node.port = Some(0);
        node.services.push(Service {
            name: "bk".to_string(),
            cluster_names: vec!["c1".to_string(), "c2".to_string()],
        });

        let out = format_nodes(&[node, Node::named("node02")], 30);
        assert!(out.contains("HOST NAME"));
        assert!(out.contains("node01"));
        assert!(out.contains("c1-bk, c2-bk"));
        assert!(out.contains("user: ohara, port: 0"));
        assert!(out.contains("node02"));
    }

    #[test]
    fn test_format_saved() {
        let mut node = Node::named("node03");
        assert!(format_saved(&node, true).contains("node03"));

        node.port = Some(22);
        assert!(format_saved(&node, false).contains("(port: 22)"));
    }
}
