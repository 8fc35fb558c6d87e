//! Node table rendering

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::formatting::{format_timestamp, node_ssh_label, service_names_label, truncate_string};
use crate::models::Node;
use crate::tui::app::{App, EDIT_COLUMN_WIDTH};
use crate::tui::theme::Theme;

use super::widgets::{create_table_header, spinner_char};

pub const COLUMNS: [&str; 4] = ["HOST NAME", "SERVICES", "SSH", "EDIT"];

pub fn render_nodes_view(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(format!(" Nodes ({}) ", app.page.nodes().len()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.page.is_loading() || app.page.nodes().is_empty() {
        let msg = if app.page.is_loading() {
            format!("{} Loading nodes...", spinner_char(app.spinner_frame))
        } else {
            "No nodes found".to_string()
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Min(1),    // Node table
        Constraint::Length(2), // Selected node detail
    ])
    .split(inner);

    render_nodes_table(app, frame, chunks[0], theme);
    render_node_detail_footer(app.selected_node(), frame, chunks[1], theme);
}

fn render_nodes_table(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let header = create_table_header(&COLUMNS, theme);

    let available_height = area.height.saturating_sub(1) as usize;
    let selected = app.list_state.selected;
    let name_max = app.config.display.name_max_length;

    let rows: Vec<Row> = app
        .page
        .nodes()
        .iter()
        .enumerate()
        .skip(app.list_state.scroll_offset)
        .take(available_height)
        .map(|(i, node)| node_to_row(node, i == selected, name_max, theme))
        .collect();

    let widths = [
        Constraint::Min(15),                   // Host name
        Constraint::Fill(1),                   // Services
        Constraint::Length(24),                // SSH
        Constraint::Length(EDIT_COLUMN_WIDTH), // Edit
    ];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, area);
}

fn node_to_row(node: &Node, is_selected: bool, name_max: usize, theme: &Theme) -> Row<'static> {
    let row_style = if is_selected {
        Style::default().bg(theme.selected_bg).fg(theme.selected_fg)
    } else {
        Style::default().fg(theme.fg)
    };

    Row::new(vec![
        Cell::from(truncate_string(&node.name, name_max)).style(Style::default().fg(theme.host)),
        Cell::from(service_names_label(Some(node))).style(Style::default().fg(theme.services)),
        Cell::from(node_ssh_label(node)),
        Cell::from("[edit]").style(Style::default().fg(theme.link).underlined()),
    ])
    .style(row_style)
}

fn render_node_detail_footer(node: Option<&Node>, frame: &mut Frame, area: Rect, theme: &Theme) {
    let Some(node) = node else {
        return;
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(node.name.clone(), Style::default().fg(theme.host).bold()),
            Span::styled(
                format!("  {} service instance(s)", node.service_instance_count()),
                Style::default().fg(theme.muted),
            ),
        ]),
        Line::from(vec![
            Span::styled("SSH: ", Style::default().fg(theme.muted)),
            Span::raw(node_ssh_label(node)),
            Span::styled("  Modified: ", Style::default().fg(theme.muted)),
            Span::raw(format_timestamp(node.last_modified_local())),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}
