//! Overlay and popup rendering
//!
//! Handles rendering of help, the node form dialog, and toast notifications.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::formatting::service_names_label;
use crate::tui::app::{App, FormField, NodeForm, Toast};
use crate::tui::theme::Theme;

use super::widgets::{centered_fixed, centered_rect, detail_row};

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(60, 80, area);

    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().fg(theme.border_focused).bold(),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "nodeman - Keyboard Shortcuts",
            Style::default().bold(),
        )]),
        Line::from(""),
        section("Navigation"),
        Line::from("  j / Down       Move selection down"),
        Line::from("  k / Up         Move selection up"),
        Line::from("  g / Home       Jump to top"),
        Line::from("  G / End        Jump to bottom"),
        Line::from("  Ctrl+d / PgDn  Page down"),
        Line::from("  Ctrl+u / PgUp  Page up"),
        Line::from("  Mouse click    Select row ([edit] opens editor)"),
        Line::from(""),
        section("Nodes"),
        Line::from("  n              Add a node"),
        Line::from("  e / Enter      Edit selected node"),
        Line::from("  y              Copy host name to clipboard"),
        Line::from("  r              Reload node list"),
        Line::from(""),
        section("Node dialog"),
        Line::from("  Tab / Down     Next field"),
        Line::from("  S-Tab / Up     Previous field"),
        Line::from("  Ctrl+u         Clear field"),
        Line::from("  Enter          Save"),
        Line::from("  Esc            Close without saving"),
        Line::from(""),
        section("General"),
        Line::from("  ?/F1           Show this help"),
        Line::from("  q              Quit application"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ? or Esc to close this help",
            Style::default().fg(theme.muted),
        )]),
    ];

    let help_para = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        )
        .style(Style::default().fg(theme.fg));

    frame.render_widget(help_para, popup_area);
}

/// New/Edit node dialog
pub fn render_node_form(app: &App, form: &NodeForm, frame: &mut Frame, area: Rect, theme: &Theme) {
    let height = if form.is_edit() { 10 } else { 8 };
    let popup_area = centered_fixed(56, height, area);

    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        lines.push(form_field_line(form, field, theme));
    }

    if form.is_edit() {
        lines.push(Line::from(""));
        let services = service_names_label(app.page.active_node());
        let services = if services.is_empty() {
            "-".to_string()
        } else {
            services
        };
        lines.push(detail_row("Services", services, theme));
    }

    lines.push(Line::from(""));
    let status = if form.is_saving() {
        Line::from(Span::styled("Saving...", Style::default().fg(theme.warn)))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(theme.error)))
    } else {
        Line::from(Span::styled(
            "Enter: save  Esc: cancel  Tab: next field",
            Style::default().fg(theme.muted),
        ))
    };
    lines.push(status);

    let para = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused))
            .title(form.title()),
    );

    frame.render_widget(para, popup_area);
}

fn form_field_line<'a>(form: &'a NodeForm, field: FormField, theme: &Theme) -> Line<'a> {
    let focused = form.focused == field;
    let read_only = form.is_read_only(field);

    let value = match field {
        FormField::Password if form.is_edit() && form.password.is_empty() && !focused => {
            "(unchanged)".to_string()
        }
        FormField::Password => "*".repeat(form.password.chars().count()),
        _ => form.value(field).to_string(),
    };
    let cursor = if focused { "_" } else { "" };

    let label_style = if focused {
        Style::default().fg(theme.border_focused).bold()
    } else {
        Style::default().fg(theme.muted)
    };
    let value_style = if read_only {
        Style::default().fg(theme.muted)
    } else {
        Style::default().fg(theme.fg).bg(theme.input_bg)
    };

    Line::from(vec![
        Span::styled(format!(" {:<11}", field.label()), label_style),
        Span::styled(format!("{}{}", value, cursor), value_style),
    ])
}

pub fn render_toast(toast: &Toast, frame: &mut Frame, area: Rect, theme: &Theme) {
    // Position toast at bottom-right
    let toast_width = (toast.message.len() + 4).min(40) as u16;
    let toast_area = Rect {
        x: area.width.saturating_sub(toast_width + 2),
        y: area.height.saturating_sub(4),
        width: toast_width,
        height: 3,
    };

    frame.render_widget(Clear, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.status_color(toast.success)));

    let para = Paragraph::new(format!(" {} ", toast.message))
        .block(block)
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center);

    frame.render_widget(para, toast_area);
}
