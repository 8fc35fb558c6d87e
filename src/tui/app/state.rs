//! Application state types for the TUI
//!
//! This module contains the view-level state that surrounds the page state:
//! - Selection and navigation state (ListState)
//! - Feedback state for errors, config warnings and toast notifications
//! - Timing state for activity tracking

use std::time::{Duration, Instant};

// ============================================================================
// Toast
// ============================================================================

/// Transient notification (save results, clipboard yank)
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub success: bool,
    pub timestamp: Instant,
}

impl Toast {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
            timestamp: Instant::now(),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
            timestamp: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < Duration::from_secs(2)
    }
}

// ============================================================================
// List Navigation State
// ============================================================================

/// List state with selection and scroll tracking
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    pub scroll_offset: usize,
    pub visible_count: usize,
}

impl ListState {
    pub fn clamp(&mut self, list_len: usize) {
        if list_len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else {
            self.selected = self.selected.min(list_len - 1);
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            } else if self.visible_count > 0
                && self.selected >= self.scroll_offset + self.visible_count
            {
                self.scroll_offset = self.selected.saturating_sub(self.visible_count - 1);
            }
        }
    }

    pub fn move_up(&mut self, list_len: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.clamp(list_len);
        }
    }

    pub fn move_down(&mut self, list_len: usize) {
        if list_len > 0 && self.selected < list_len - 1 {
            self.selected += 1;
            self.clamp(list_len);
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn move_to_bottom(&mut self, list_len: usize) {
        if list_len > 0 {
            self.selected = list_len - 1;
            if self.visible_count > 0 {
                self.scroll_offset = list_len.saturating_sub(self.visible_count);
            }
        }
    }

    pub fn page_up(&mut self, list_len: usize) {
        let page = self.visible_count.max(1);
        self.selected = self.selected.saturating_sub(page);
        self.clamp(list_len);
    }

    pub fn page_down(&mut self, list_len: usize) {
        if list_len == 0 {
            return;
        }
        let page = self.visible_count.max(1);
        self.selected = (self.selected + page).min(list_len - 1);
        self.clamp(list_len);
    }
}

// ============================================================================
// Feedback State
// ============================================================================

/// Unified feedback state for errors, warnings, and transient messages
#[derive(Debug)]
pub struct FeedbackState {
    last_error: Option<(String, Instant)>,
    error_display_duration: Duration,
    pub config_warnings: Vec<String>,
    toast: Option<Toast>,
}

impl FeedbackState {
    pub fn new(config_warnings: Vec<String>) -> Self {
        Self {
            last_error: None,
            error_display_duration: Duration::from_secs(5),
            config_warnings,
            toast: None,
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some((msg, Instant::now()));
    }

    /// Current error message, if still within its display window
    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        self.last_error
            .as_ref()
            .filter(|(_, t)| t.elapsed() < self.error_display_duration)
            .map(|(msg, _)| msg.as_str())
    }

    pub fn set_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    #[must_use]
    pub fn current_toast(&self) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_visible())
    }
}

// ============================================================================
// Timing State
// ============================================================================

/// Grouped timing state for activity tracking
#[derive(Debug)]
pub struct TimingState {
    pub last_input: Instant,
    pub last_refresh: Option<Instant>,
}

impl Default for TimingState {
    fn default() -> Self {
        Self {
            last_input: Instant::now(),
            last_refresh: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_state_navigation() {
        let mut state = ListState {
            visible_count: 10,
            ..Default::default()
        };

        state.move_down(5);
        assert_eq!(state.selected, 1);

        state.move_to_bottom(5);
        assert_eq!(state.selected, 4);

        state.move_to_top();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_list_state_paging() {
        let mut state = ListState {
            visible_count: 3,
            ..Default::default()
        };

        state.page_down(10);
        assert_eq!(state.selected, 3);
        state.page_down(10);
        state.page_down(10);
        state.page_down(10);
        assert_eq!(state.selected, 9);
        assert_eq!(state.scroll_offset, 7);

        state.page_up(10);
        assert_eq!(state.selected, 6);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut state = ListState {
            selected: 8,
            ..Default::default()
        };
        state.clamp(3);
        assert_eq!(state.selected, 2);
        state.clamp(0);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_feedback_error_and_toast() {
        let mut feedback = FeedbackState::new(vec!["bad config".to_string()]);
        assert_eq!(feedback.current_error(), None);

        feedback.set_error("nodes: HTTP 500".to_string());
        assert_eq!(feedback.current_error(), Some("nodes: HTTP 500"));

        feedback.set_toast(Toast::success("Saved".to_string()));
        assert!(feedback.current_toast().is_some_and(|t| t.success));
        assert_eq!(feedback.config_warnings.len(), 1);
    }
}
