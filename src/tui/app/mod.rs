//! Application state and core logic for the TUI
//!
//! `App` owns the node list page. Page data (nodes, loading flag, modal,
//! active node) lives in the immutable [`PageState`] and changes only through
//! [`App::dispatch`]. View-level state (selection, help overlay, the open
//! form, toasts) is mutated in place, TEA-style.

mod form;
mod page;
mod state;

pub use form::{FormField, FormMode, NodeForm, Submission};
pub use page::{NodeModal, PageAction, PageState};
pub use state::{FeedbackState, ListState, TimingState, Toast};

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::api::NodeApi;
use crate::models::{Config, Node};
use crate::tui::event::{DataEvent, DataSource, EventResult, InputEvent, KeyAction};
use crate::tui::runtime::{RefreshBackoff, spawn_node_fetch, spawn_node_save};

/// Screen row of the first table body row (title, border, header above it)
pub const TABLE_FIRST_ROW: u16 = 3;
/// Rows taken by everything except the table body
pub const TABLE_CHROME_ROWS: u16 = 8;
/// Width of the EDIT column, right-aligned inside the table border
pub const EDIT_COLUMN_WIDTH: u16 = 8;

/// Main application state
pub struct App {
    // Lifecycle
    pub running: bool,

    // Page data
    pub page: PageState,

    // View state
    pub form: Option<NodeForm>,
    pub show_help: bool,
    pub list_state: ListState,
    pub spinner_frame: usize,
    /// Terminal size as of the last render (width, height)
    pub viewport: (u16, u16),

    pub feedback: FeedbackState,
    pub timing: TimingState,

    pub config: Config,

    // Background work
    api: Arc<dyn NodeApi>,
    data_tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    tasks: TaskTracker,
    backoff: Arc<RefreshBackoff>,
    fetch_in_flight: bool,
    refetch_queued: bool,
    last_save_id: u64,
}

impl App {
    /// Create a new App instance.
    ///
    /// Results of background requests come back through `data_tx`.
    pub fn new(
        config: Config,
        config_warnings: Vec<String>,
        api: Arc<dyn NodeApi>,
        data_tx: mpsc::Sender<DataEvent>,
    ) -> Self {
        Self {
            running: true,
            page: PageState::mount(),
            form: None,
            show_help: false,
            list_state: ListState::default(),
            spinner_frame: 0,
            viewport: (0, 0),
            feedback: FeedbackState::new(config_warnings),
            timing: TimingState::default(),
            config,
            api,
            data_tx,
            cancel: CancellationToken::new(),
            tasks: TaskTracker::new(),
            backoff: Arc::new(RefreshBackoff::default()),
            fetch_in_flight: false,
            refetch_queued: false,
            last_save_id: 0,
        }
    }

    /// Tie background requests to an outer cancellation token
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Spawn requests on the runtime's tracker so shutdown waits for them
    pub fn with_task_tracker(mut self, tasks: TaskTracker) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_refresh_backoff(mut self, backoff: Arc<RefreshBackoff>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Page became active: load the node list
    pub fn mount(&mut self) {
        tracing::debug!("node page mounted");
        self.request_fetch();
    }

    /// Page is going away: stop accepting results and abandon requests
    pub fn unmount(&mut self) {
        self.dispatch(PageAction::Unmount);
        self.cancel.cancel();
        tracing::debug!("node page unmounted");
    }

    /// Apply a page transition
    pub fn dispatch(&mut self, action: PageAction) {
        self.page = std::mem::take(&mut self.page).reduce(action);
    }

    /// Record the terminal size so paging and mouse hit-testing match the screen
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        self.list_state.visible_count = height.saturating_sub(TABLE_CHROME_ROWS) as usize;
        self.list_state.clamp(self.page.nodes().len());
    }

    /// Start a list fetch unless one is already running
    pub fn request_fetch(&mut self) {
        if !self.page.is_live() {
            return;
        }
        if self.fetch_in_flight {
            self.refetch_queued = true;
            return;
        }
        self.fetch_in_flight = true;
        spawn_node_fetch(
            &self.tasks,
            self.api.clone(),
            self.data_tx.clone(),
            self.cancel.clone(),
        );
    }

    /// Node under the cursor
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.page.nodes().get(self.list_state.selected)
    }

    #[must_use]
    pub fn current_toast(&self) -> Option<&Toast> {
        self.feedback.current_toast()
    }

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        self.timing.last_input = Instant::now();

        match event {
            InputEvent::Key(key_event) => {
                let action = KeyAction::from_key_event(key_event, self.form.is_some());
                self.handle_action(action)
            }
            InputEvent::Resize(_, _) => EventResult::Continue,
            InputEvent::Mouse(mouse_event) => {
                let action = KeyAction::from_mouse_event(mouse_event);
                self.handle_action(action)
            }
        }
    }

    /// Handle a key action
    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Help overlay takes priority
        if self.show_help {
            return match action {
                KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit => {
                    self.show_help = false;
                    EventResult::Continue
                }
                _ => EventResult::Unchanged,
            };
        }

        if self.form.is_some() {
            return self.handle_form_action(action);
        }

        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        match action {
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            KeyAction::NewNode => {
                self.open_new();
                EventResult::Continue
            }
            KeyAction::EditNode | KeyAction::Select => {
                self.open_edit_selected();
                EventResult::Continue
            }
            KeyAction::Refresh => {
                self.request_fetch();
                EventResult::Continue
            }
            KeyAction::YankName => {
                self.yank_selected_name();
                EventResult::Continue
            }
            KeyAction::ShowHelp => {
                self.show_help = true;
                EventResult::Continue
            }
            KeyAction::MouseClick { row, column } => {
                self.handle_mouse_click(row, column);
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        let len = self.page.nodes().len();
        match action {
            KeyAction::MoveUp | KeyAction::MouseScrollUp => self.list_state.move_up(len),
            KeyAction::MoveDown | KeyAction::MouseScrollDown => self.list_state.move_down(len),
            KeyAction::MoveToTop => self.list_state.move_to_top(),
            KeyAction::MoveToBottom => self.list_state.move_to_bottom(len),
            KeyAction::PageUp => self.list_state.page_up(len),
            KeyAction::PageDown => self.list_state.page_down(len),
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    /// Select the clicked row; a click in the EDIT column also opens the editor
    fn handle_mouse_click(&mut self, row: u16, column: u16) {
        if row < TABLE_FIRST_ROW {
            return;
        }
        // Rows past the table body are the footer and status bar
        let body_row = (row - TABLE_FIRST_ROW) as usize;
        if body_row >= self.list_state.visible_count {
            return;
        }

        let target = self.list_state.scroll_offset + body_row;
        if target >= self.page.nodes().len() {
            return;
        }
        self.list_state.selected = target;

        let (width, _) = self.viewport;
        let edit_start = width.saturating_sub(EDIT_COLUMN_WIDTH + 1);
        if width > 0 && column >= edit_start {
            self.open_edit_selected();
        }
    }

    /// Handle actions while the New/Edit dialog is open
    fn handle_form_action(&mut self, action: KeyAction) -> EventResult {
        let Some(form) = self.form.as_mut() else {
            return EventResult::Unchanged;
        };

        match action {
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            KeyAction::Escape => {
                self.close_modal();
                EventResult::Continue
            }
            KeyAction::Select => {
                self.submit_form();
                EventResult::Continue
            }
            KeyAction::NextField => {
                form.focus_next();
                EventResult::Continue
            }
            KeyAction::PrevField => {
                form.focus_prev();
                EventResult::Continue
            }
            KeyAction::FieldChar(c) => {
                form.insert_char(c);
                EventResult::Continue
            }
            KeyAction::FieldBackspace => {
                form.backspace();
                EventResult::Continue
            }
            KeyAction::FieldClear => {
                form.clear_field();
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Open the New dialog
    pub fn open_new(&mut self) {
        self.form = Some(NodeForm::new_node());
        self.dispatch(PageAction::OpenNew);
    }

    /// Open the Edit dialog for the selected node
    pub fn open_edit_selected(&mut self) {
        if let Some(node) = self.selected_node().cloned() {
            self.form = Some(NodeForm::edit_node(&node));
            self.dispatch(PageAction::OpenEdit(node));
        }
    }

    /// Close whichever dialog is open
    pub fn close_modal(&mut self) {
        self.form = None;
        self.dispatch(PageAction::Close);
    }

    /// Validate the form and send it
    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.is_saving() {
            return;
        }

        match form.submission() {
            Ok(submission) => {
                self.last_save_id += 1;
                form.pending_save = Some(self.last_save_id);
                form.error = None;
                spawn_node_save(
                    &self.tasks,
                    self.api.clone(),
                    self.last_save_id,
                    submission,
                    self.data_tx.clone(),
                    self.cancel.clone(),
                );
            }
            Err(message) => form.error = Some(message),
        }
    }

    /// Copy the selected host name to the clipboard
    fn yank_selected_name(&mut self) {
        let Some(name) = self.selected_node().map(|n| n.name.clone()) else {
            return;
        };

        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(&name));
        self.feedback.set_toast(match result {
            Ok(()) => Toast::success(format!("Copied: {}", name)),
            Err(e) => {
                tracing::debug!(error = %e, "clipboard unavailable");
                Toast::failure("Failed to copy (no clipboard)".to_string())
            }
        });
    }

    /// Handle a data event
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::NodesUpdated(response) => {
                self.backoff.record_success();
                self.finish_fetch();
                self.dispatch(PageAction::NodesLoaded(response.result));
                self.list_state.clamp(self.page.nodes().len());
                self.timing.last_refresh = Some(Instant::now());
                EventResult::Continue
            }
            DataEvent::FetchError { source, error } => {
                if source == DataSource::Nodes {
                    self.backoff.record_failure();
                    self.finish_fetch();
                    self.dispatch(PageAction::FetchFailed(error.clone()));
                }
                if self.page.is_live() {
                    self.feedback.set_error(format!("{}: {}", source, error));
                }
                EventResult::Continue
            }
            DataEvent::NodeSaveResult {
                save_id,
                success,
                message,
            } => {
                // The dialog may have been closed, or replaced, since the request went out
                let owner_open = self
                    .form
                    .as_ref()
                    .is_some_and(|f| f.pending_save == Some(save_id));

                if success {
                    self.feedback.set_toast(Toast::success(message));
                    self.request_fetch();
                    if owner_open {
                        self.close_modal();
                    }
                } else if owner_open && let Some(form) = self.form.as_mut() {
                    form.pending_save = None;
                    form.error = Some(message);
                } else {
                    self.feedback.set_error(message);
                }
                EventResult::Continue
            }
            DataEvent::RefreshTick => {
                self.request_fetch();
                EventResult::Unchanged
            }
            DataEvent::AnimationTick => {
                // Only redraw while the spinner is visible
                if self.page.is_loading() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    EventResult::Continue
                } else {
                    EventResult::Unchanged
                }
            }
        }
    }

    /// A fetch finished; start the one that was requested meanwhile
    fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
        if std::mem::take(&mut self.refetch_queued) {
            self.request_fetch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Result as ApiResult;
    use crate::models::{NodeDraft, NodeListResponse};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Mutex;

    /// Records saves and serves a fixed node list
    #[derive(Default)]
    struct FakeApi {
        nodes: Vec<Node>,
        saved: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NodeApi for FakeApi {
        async fn fetch_nodes(&self) -> ApiResult<NodeListResponse> {
            Ok(NodeListResponse {
                result: Some(self.nodes.clone()),
            })
        }

        async fn create_node(&self, draft: &NodeDraft) -> ApiResult<Node> {
            self.saved.lock().unwrap().push(format!("create {}", draft.name));
            Ok(Node::named(draft.name.clone()))
        }

        async fn update_node(&self, name: &str, _draft: &NodeDraft) -> ApiResult<Node> {
            self.saved.lock().unwrap().push(format!("update {}", name));
            Ok(Node::named(name))
        }
    }

    fn app_with(nodes: &[&str]) -> (App, mpsc::Receiver<DataEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let api = Arc::new(FakeApi {
            nodes: nodes.iter().map(|n| Node::named(*n)).collect(),
            ..Default::default()
        });
        let mut app = App::new(Config::default(), Vec::new(), api, tx);
        app.set_viewport(80, 24);
        (app, rx)
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded(app: &mut App, names: &[&str]) {
        app.handle_data(DataEvent::NodesUpdated(NodeListResponse {
            result: Some(names.iter().map(|n| Node::named(*n)).collect()),
        }));
    }

    #[tokio::test]
    async fn test_mount_fetches_sorted_nodes() {
        let (mut app, mut rx) = app_with(&["c", "a", "b"]);
        app.mount();
        let event = rx.recv().await.unwrap();
        app.handle_data(event);

        let names: Vec<_> = app.page.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(!app.page.is_loading());
        assert!(app.timing.last_refresh.is_some());
    }

    #[tokio::test]
    async fn test_refresh_coalesces_while_in_flight() {
        let (mut app, mut rx) = app_with(&["a"]);
        app.mount();
        app.handle_input(key(KeyCode::Char('r')));
        assert!(app.refetch_queued);

        // First answer triggers the queued fetch
        let event = rx.recv().await.unwrap();
        app.handle_data(event);
        assert!(app.fetch_in_flight);
        assert!(!app.refetch_queued);
        assert!(rx.recv().await.is_some());
    }

    #[test]
    fn test_open_edit_uses_selection() {
        let (mut app, _rx) = app_with(&[]);
        loaded(&mut app, &["b", "a"]);
        app.handle_input(key(KeyCode::Char('j')));
        app.handle_input(key(KeyCode::Char('e')));

        assert!(app.page.is_edit_modal_open());
        assert_eq!(app.page.active_node().map(|n| n.name.as_str()), Some("b"));
        assert!(app.form.as_ref().is_some_and(|f| f.is_edit()));
    }

    #[test]
    fn test_edit_without_nodes_is_noop() {
        let (mut app, _rx) = app_with(&[]);
        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.page.modal(), NodeModal::Closed);
        assert!(app.form.is_none());
    }

    #[test]
    fn test_escape_closes_form_and_keeps_active_node() {
        let (mut app, _rx) = app_with(&[]);
        loaded(&mut app, &["a"]);
        app.open_edit_selected();
        app.handle_input(key(KeyCode::Esc));

        assert_eq!(app.page.modal(), NodeModal::Closed);
        assert!(app.form.is_none());
        assert!(app.page.active_node().is_some());
    }

    #[test]
    fn test_form_keys_do_not_quit() {
        let (mut app, _rx) = app_with(&[]);
        app.handle_input(key(KeyCode::Char('n')));
        assert!(app.page.is_new_modal_open());

        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), EventResult::Continue);
        assert!(app.running);
        assert_eq!(app.form.as_ref().map(|f| f.name.as_str()), Some("q"));
    }

    #[test]
    fn test_invalid_submit_shows_error_in_form() {
        let (mut app, _rx) = app_with(&[]);
        app.open_new();
        app.handle_input(key(KeyCode::Enter));

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Host name is required"));
        assert!(!form.is_saving());
        assert!(app.page.is_new_modal_open());
    }

    #[tokio::test]
    async fn test_save_success_closes_and_refetches() {
        let (mut app, mut rx) = app_with(&["a"]);
        app.open_new();
        {
            let form = app.form.as_mut().unwrap();
            form.name = "node9".to_string();
            form.user = "ohara".to_string();
            form.password = "pw".to_string();
        }
        app.handle_input(key(KeyCode::Enter));
        assert!(app.form.as_ref().is_some_and(|f| f.is_saving()));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, DataEvent::NodeSaveResult { success: true, .. }));
        app.handle_data(event);

        assert!(app.form.is_none());
        assert_eq!(app.page.modal(), NodeModal::Closed);
        assert!(app.current_toast().is_some_and(|t| t.success));
        assert!(matches!(rx.recv().await, Some(DataEvent::NodesUpdated(_))));
    }

    #[test]
    fn test_save_failure_keeps_form_open() {
        let (mut app, _rx) = app_with(&[]);
        app.open_new();
        app.form.as_mut().unwrap().pending_save = Some(1);
        app.handle_data(DataEvent::NodeSaveResult {
            save_id: 1,
            success: false,
            message: "save: HTTP 400 Bad Request: duplicate".to_string(),
        });

        let form = app.form.as_ref().unwrap();
        assert!(!form.is_saving());
        assert!(form.error.as_deref().is_some_and(|e| e.contains("duplicate")));
        assert!(app.page.is_new_modal_open());
    }

    #[tokio::test]
    async fn test_late_save_does_not_close_reopened_form() {
        let (mut app, _rx) = app_with(&[]);
        loaded(&mut app, &["a"]);
        app.open_edit_selected();
        app.form.as_mut().unwrap().pending_save = Some(1);

        // Cancel the pending edit and start a new node
        app.handle_input(key(KeyCode::Esc));
        app.handle_input(key(KeyCode::Char('n')));
        app.handle_input(key(KeyCode::Char('x')));

        app.handle_data(DataEvent::NodeSaveResult {
            save_id: 1,
            success: true,
            message: "Updated node a".to_string(),
        });

        assert_eq!(app.page.modal(), NodeModal::New);
        assert_eq!(app.form.as_ref().map(|f| f.name.as_str()), Some("x"));
        assert!(app.current_toast().is_some_and(|t| t.success));
        assert!(app.fetch_in_flight);
    }

    #[test]
    fn test_late_save_failure_goes_to_status_bar() {
        let (mut app, _rx) = app_with(&[]);
        app.open_new();
        app.form.as_mut().unwrap().pending_save = Some(1);
        app.handle_input(key(KeyCode::Esc));
        app.open_new();

        app.handle_data(DataEvent::NodeSaveResult {
            save_id: 1,
            success: false,
            message: "save: HTTP 409 Conflict".to_string(),
        });

        assert!(app.form.as_ref().is_some_and(|f| f.error.is_none()));
        assert_eq!(app.feedback.current_error(), Some("save: HTTP 409 Conflict"));
    }

    #[test]
    fn test_fetch_failures_stretch_refresh() {
        let (mut app, _rx) = app_with(&[]);
        let base = std::time::Duration::from_secs(10);
        for _ in 0..2 {
            app.handle_data(DataEvent::FetchError {
                source: DataSource::Nodes,
                error: "HTTP 503".to_string(),
            });
        }
        assert_eq!(app.backoff.interval(base), base * 4);

        loaded(&mut app, &["a"]);
        assert_eq!(app.backoff.interval(base), base);
    }

    #[test]
    fn test_fetch_error_keeps_nodes() {
        let (mut app, _rx) = app_with(&[]);
        loaded(&mut app, &["a", "b"]);
        app.handle_data(DataEvent::FetchError {
            source: DataSource::Nodes,
            error: "HTTP 503".to_string(),
        });
        assert_eq!(app.page.nodes().len(), 2);
        assert_eq!(app.page.error(), Some("HTTP 503"));
        assert_eq!(app.feedback.current_error(), Some("nodes: HTTP 503"));
    }

    #[test]
    fn test_results_after_unmount_ignored() {
        let (mut app, _rx) = app_with(&[]);
        app.unmount();
        loaded(&mut app, &["late"]);
        assert!(app.page.nodes().is_empty());
        assert!(app.page.is_loading());
    }

    #[test]
    fn test_mouse_click_selects_and_edits() {
        let (mut app, _rx) = app_with(&[]);
        loaded(&mut app, &["a", "b", "c"]);

        app.handle_action(KeyAction::MouseClick {
            row: TABLE_FIRST_ROW + 2,
            column: 5,
        });
        assert_eq!(app.list_state.selected, 2);
        assert!(app.form.is_none());

        app.handle_action(KeyAction::MouseClick {
            row: TABLE_FIRST_ROW + 1,
            column: 75,
        });
        assert_eq!(app.list_state.selected, 1);
        assert!(app.page.is_edit_modal_open());
    }

    #[test]
    fn test_click_below_table_body_is_ignored() {
        let (mut app, _rx) = app_with(&[]);
        let names: Vec<String> = (0..40).map(|i| format!("n{:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        loaded(&mut app, &refs);
        assert_eq!(app.list_state.visible_count, 16);

        // Status bar row, EDIT column
        app.handle_action(KeyAction::MouseClick { row: 22, column: 75 });
        assert_eq!(app.list_state.selected, 0);
        assert!(app.form.is_none());
        assert!(!app.page.is_edit_modal_open());

        // Last visible body row still works
        app.handle_action(KeyAction::MouseClick {
            row: TABLE_FIRST_ROW + 15,
            column: 5,
        });
        assert_eq!(app.list_state.selected, 15);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, _rx) = app_with(&[]);
        app.handle_input(key(KeyCode::Char('?')));
        assert!(app.show_help);
        assert_eq!(app.handle_input(key(KeyCode::Char('n'))), EventResult::Unchanged);
        assert!(!app.page.is_new_modal_open());
        app.handle_input(key(KeyCode::Esc));
        assert!(!app.show_help);
    }
}
