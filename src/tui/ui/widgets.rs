//! Reusable UI widgets and helper functions
//!
//! This module contains shared rendering utilities used by the page and its overlays.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

use crate::tui::theme::Theme;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Create a styled table header row from column names
pub fn create_table_header<'a>(columns: &[&'a str], theme: &Theme) -> Row<'a> {
    let header_cells = columns
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(theme.header_fg).bold()));
    Row::new(header_cells)
        .style(Style::default().bg(theme.header_bg))
        .height(1)
}

/// Create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Centered rectangle with a fixed size, shrunk to fit `area`
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Spinner glyph for the given animation frame
pub fn spinner_char(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// A `label: value` line for detail panes
pub fn detail_row<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(theme.fg)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_fits_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_fixed(50, 12, area);
        assert_eq!(rect, Rect::new(15, 6, 50, 12));

        let small = Rect::new(0, 0, 30, 5);
        let rect = centered_fixed(50, 12, small);
        assert_eq!(rect, Rect::new(0, 0, 30, 5));
    }

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner_char(0), '|');
        assert_eq!(spinner_char(5), '/');
    }
}
