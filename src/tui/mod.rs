//! Terminal User Interface for nodeman
//!
//! This module provides an interactive node list page. It features:
//! - Node table sorted by host name, with add and edit dialogs
//! - Dual-channel event architecture (priority input, backpressure-aware data)
//! - Keyboard and mouse navigation
//! - Optional periodic refresh that backs off while the API is failing
//! - Graceful teardown: results arriving after exit are discarded

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;

use std::io::{self, IsTerminal, stdout};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::api::NodeApi;
use crate::models::Config;
use crate::tui::app::App;
use crate::tui::runtime::{
    RefreshBackoff, TuiRuntime, create_channels, run_event_loop, spawn_animation_tick,
    spawn_input_task, spawn_refresh_ticker,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let is_tty = stdout().is_terminal();
        let term_type = std::env::var("TERM").unwrap_or_default();
        Self::from_parts(is_tty, term_type)
    }

    fn from_parts(is_tty: bool, term_type: String) -> Self {
        // Known problematic terminals
        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use 'nodeman list' instead."
                .to_string()
        } else if !self.supports_alternate_screen {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use CLI mode.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        } else {
            "Unknown terminal capability issue.".to_string()
        }
    }
}

/// Run the TUI application
pub async fn run_tui(
    config: Config,
    config_warnings: Vec<String>,
    api: Arc<dyn NodeApi>,
) -> Result<()> {
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let mut terminal = setup_terminal()?;

    let (input_tx, input_rx, data_tx, data_rx) = create_channels();

    let mut runtime = TuiRuntime::new();
    let backoff = Arc::new(RefreshBackoff::default());
    let animation_visible = Arc::new(AtomicBool::new(true));

    let auto_refresh = config
        .refresh
        .auto_refresh
        .then(|| Duration::from_secs(config.refresh.interval));

    let mut app = App::new(config, config_warnings, api, data_tx.clone())
        .with_cancel_token(runtime.cancel_token())
        .with_task_tracker(runtime.task_tracker())
        .with_refresh_backoff(backoff.clone());

    // Background tasks
    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));

    if let Some(interval) = auto_refresh {
        runtime.track(spawn_refresh_ticker(
            data_tx.clone(),
            runtime.cancel_token(),
            backoff,
            interval,
        ));
    }

    runtime.track(spawn_animation_tick(
        data_tx,
        runtime.cancel_token(),
        animation_visible.clone(),
    ));

    app.mount();

    let result = run_event_loop(app, input_rx, data_rx, animation_visible, |app| {
        let size = terminal.size()?;
        app.set_viewport(size.width, size.height);
        terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    })
    .await;

    // On error the app is already dropped; shutdown cancels its requests
    let result = result.map(|mut app| app.unmount());

    runtime.shutdown().await;
    restore_terminal(&mut terminal)?;

    result
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI with the tokio runtime (entry point from main)
pub fn run(config: Config, config_warnings: Vec<String>, api: Arc<dyn NodeApi>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_tui(config, config_warnings, api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_capabilities() {
        let caps = TerminalCapabilities::from_parts(true, "xterm-256color".to_string());
        assert!(caps.is_suitable());

        let caps = TerminalCapabilities::from_parts(true, "dumb".to_string());
        assert!(!caps.is_suitable());
        assert!(caps.error_message().contains("'dumb'"));

        let caps = TerminalCapabilities::from_parts(false, "xterm".to_string());
        assert!(caps.error_message().contains("nodeman list"));
    }
}
