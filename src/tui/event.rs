//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: Priority channel for user input (never dropped)
//! - DataEvent: Data channel for fetch/save results and ticks

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use crate::models::NodeListResponse;

/// Input events from the terminal (priority channel - never dropped)
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Data source identifiers for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Nodes,
    Save,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Nodes => write!(f, "nodes"),
            DataSource::Save => write!(f, "save"),
        }
    }
}

/// Data and control events
#[derive(Debug)]
pub enum DataEvent {
    /// Spinner tick while the first fetch is pending
    AnimationTick,

    /// Periodic refresh is due
    RefreshTick,

    /// Node list fetched
    NodesUpdated(NodeListResponse),

    /// Fetch error from a data source
    FetchError { source: DataSource, error: String },

    /// Create/update completed (success or failure).
    ///
    /// `save_id` matches the `pending_save` of the form that sent it.
    NodeSaveResult {
        save_id: u64,
        success: bool,
        message: String,
    },
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // Page actions
    NewNode,
    EditNode,
    Select,
    Refresh,
    YankName,

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Form mode specific
    NextField,
    PrevField,
    FieldClear,
    FieldBackspace,
    FieldChar(char),

    // Mouse actions
    MouseClick { row: u16, column: u16 },
    MouseScrollUp,
    MouseScrollDown,

    Unknown,
}

impl KeyAction {
    /// Map a mouse event to an action
    pub fn from_mouse_event(event: MouseEvent) -> Self {
        use crossterm::event::{MouseButton, MouseEventKind};

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => KeyAction::MouseClick {
                row: event.row,
                column: event.column,
            },
            MouseEventKind::ScrollUp => KeyAction::MouseScrollUp,
            MouseEventKind::ScrollDown => KeyAction::MouseScrollDown,
            _ => KeyAction::Unknown,
        }
    }

    /// Map a key event to an action based on current mode
    pub fn from_key_event(event: KeyEvent, in_form: bool) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        // Form mode: printable keys go to the focused field
        if in_form {
            return match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Tab | KeyCode::Down => KeyAction::NextField,
                KeyCode::BackTab | KeyCode::Up => KeyAction::PrevField,
                KeyCode::Backspace => KeyAction::FieldBackspace,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
                KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::FieldClear
                }
                KeyCode::Char(c) => KeyAction::FieldChar(c),
                _ => KeyAction::Unknown,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,

            // Ctrl+ combinations must come before bare character matches
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageDown,
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageUp,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
            KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
            KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,

            // Actions
            KeyCode::Char('n') => KeyAction::NewNode,
            KeyCode::Char('e') => KeyAction::EditNode,
            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char('r') => KeyAction::Refresh,
            KeyCode::Char('y') => KeyAction::YankName,

            // Help
            KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
            KeyCode::Esc => KeyAction::Escape,

            _ => KeyAction::Unknown,
        }
    }
}
