//! UI rendering for the TUI
//!
//! This module handles all rendering using ratatui. The rendering is event-driven -
//! we only render when an event triggers a state change, not at a fixed frame rate.

mod nodes;
mod overlays;
mod widgets;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::theme::Theme;

use nodes::render_nodes_view;
use overlays::{render_help_overlay, render_node_form, render_toast};

/// Render the entire TUI
pub fn render(app: &App, frame: &mut Frame) {
    let theme = Theme::from_name(&app.config.display.theme);
    let area = frame.area();

    // Main layout: title, content, footer
    let layout = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Min(0),    // Node table
        Constraint::Length(2), // Status bar
    ])
    .split(area);

    render_title_bar(app, frame, layout[0], &theme);
    render_nodes_view(app, frame, layout[1], &theme);
    render_status_bar(app, frame, layout[2], &theme);

    // Overlays (render in order of z-index)
    if let Some(form) = &app.form {
        render_node_form(app, form, frame, area, &theme);
    }
    if app.show_help {
        render_help_overlay(frame, area, &theme);
    }

    if let Some(toast) = app.current_toast() {
        render_toast(toast, frame, area, &theme);
    }
}

fn render_title_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let title = Line::from(vec![
        Span::styled(" nodeman ", Style::default().fg(theme.header_fg).bg(theme.header_bg).bold()),
        Span::styled(
            format!("  {}", app.config.api.base_url),
            Style::default().fg(theme.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Keybindings line - context-sensitive
    let keybinds = if app.form.is_some() {
        " Tab:next field  Enter:save  Esc:cancel "
    } else {
        " j/k:move  n:new  e:edit  r:reload  y:yank  ?:help  q:quit "
    };
    let keybinds_para = Paragraph::new(keybinds).style(Style::default().fg(theme.muted));
    frame.render_widget(keybinds_para, layout[0]);

    let mut status_parts = Vec::new();

    if app.page.is_loading() {
        status_parts.push(Span::styled(" Loading...", Style::default().fg(theme.warn)));
    } else if let Some(refreshed) = app.timing.last_refresh {
        let age_secs = refreshed.elapsed().as_secs();
        let age_str = if age_secs < 60 {
            format!("{}s", age_secs)
        } else {
            format!("{}m", age_secs / 60)
        };
        status_parts.push(Span::styled(
            format!(" Updated: {} ago", age_str),
            Style::default().fg(theme.muted),
        ));
    }

    if app.config.refresh.auto_refresh {
        status_parts.push(Span::styled(
            format!(" | auto {}s", app.config.refresh.interval),
            Style::default().fg(theme.muted),
        ));
    }

    // Config warnings display (persistent until fixed)
    if let Some(first) = app.feedback.config_warnings.first() {
        let warning_text = if app.feedback.config_warnings.len() == 1 {
            format!(" | WARN: {}", first)
        } else {
            format!(
                " | WARN: {} (+{} more)",
                first,
                app.feedback.config_warnings.len() - 1
            )
        };
        status_parts.push(Span::styled(warning_text, Style::default().fg(theme.warn)));
    }

    // A failed last fetch stays visible; transient errors auto-dismiss
    if let Some(error) = app.feedback.current_error() {
        status_parts.push(Span::styled(
            format!(" | ERROR: {} ", error),
            Style::default().fg(theme.error),
        ));
    } else if let Some(error) = app.page.error() {
        status_parts.push(Span::styled(
            format!(" | last fetch failed: {} ", error),
            Style::default().fg(theme.error),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(status_parts)), layout[1]);
}
