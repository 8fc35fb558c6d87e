//! Async runtime and task management for the TUI
//!
//! This module implements the dual-channel event-driven architecture:
//! - Input channel (priority): User input events that are never dropped
//! - Data channel: Fetch/save results and ticks
//!
//! The main loop uses `tokio::select!` with bias toward the input channel
//! to prevent input starvation under heavy data update loads.
//!
//! Every task holds a child of the page's `CancellationToken`. Once the page
//! is torn down, in-flight requests are abandoned and their results are never
//! delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::api::NodeApi;
use crate::tui::app::{App, Submission};
use crate::tui::event::{DataEvent, DataSource, EventResult, InputEvent};

/// Channel capacities
const INPUT_CHANNEL_CAPACITY: usize = 16;
const DATA_CHANNEL_CAPACITY: usize = 32;

const ANIMATION_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Longest refresh stretch after repeated failures (2^3 = 8x the base interval)
const MAX_BACKOFF_SHIFT: u32 = 3;

/// Stretches the periodic refresh while the node API keeps failing.
///
/// Each failed list fetch doubles the wait before the next refresh tick, up
/// to 8x. A successful fetch restores the configured interval.
#[derive(Debug, Default)]
pub struct RefreshBackoff {
    consecutive_failures: AtomicU32,
}

impl RefreshBackoff {
    pub fn record_failure(&self) {
        let _ = self
            .consecutive_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_add(1))
            });
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Wait before the next refresh tick
    #[must_use]
    pub fn interval(&self, base: Duration) -> Duration {
        let shift = self.failures().min(MAX_BACKOFF_SHIFT);
        base.saturating_mul(1 << shift)
    }
}

/// TUI runtime managing all background tasks.
///
/// Long-lived loops are registered with [`TuiRuntime::track`]. One-shot
/// requests are spawned on the shared [`TaskTracker`] so shutdown waits for
/// them as well.
pub struct TuiRuntime {
    cancel_token: CancellationToken,
    tasks: TaskTracker,
    task_handles: Vec<JoinHandle<()>>,
}

impl Default for TuiRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiRuntime {
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            tasks: TaskTracker::new(),
            task_handles: Vec::new(),
        }
    }

    /// Get a clone of the cancellation token for spawning tasks
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Tracker for request tasks spawned by the app
    pub fn task_tracker(&self) -> TaskTracker {
        self.tasks.clone()
    }

    /// Add a task handle to track
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.task_handles.push(handle);
    }

    /// Signal shutdown and wait for tasks to complete
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        self.tasks.close();

        let tasks = self.tasks;
        let shutdown = async {
            for handle in self.task_handles {
                let _ = handle.await;
            }
            tasks.wait().await;
        };

        tokio::select! {
            _ = shutdown => {}
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                tracing::debug!("background tasks did not stop in time");
            }
        }
    }
}

/// Spawn the input event reader task
pub fn spawn_input_task(tx: mpsc::Sender<InputEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            let input_event = match event {
                                Event::Key(key) => Some(InputEvent::Key(key)),
                                Event::Mouse(mouse) => Some(InputEvent::Mouse(mouse)),
                                Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
                                _ => None,
                            };

                            if let Some(evt) = input_event
                                && tx.send(evt).await.is_err()
                            {
                                break; // Receiver dropped
                            }
                        }
                        Some(Err(e)) => {
                            let is_fatal = matches!(
                                e.kind(),
                                std::io::ErrorKind::BrokenPipe
                                    | std::io::ErrorKind::ConnectionReset
                                    | std::io::ErrorKind::UnexpectedEof
                            );

                            if is_fatal {
                                tracing::info!("Terminal disconnected: {:?}", e);
                                break;
                            } else {
                                tracing::warn!("Terminal event read error: {:?}", e);
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    })
}

/// Deliver a result unless the page was torn down first.
///
/// Results are awaited rather than `try_send`-ed: the app tracks in-flight
/// requests and would otherwise wait forever for a dropped answer.
async fn deliver(tx: &mpsc::Sender<DataEvent>, cancel: &CancellationToken, event: DataEvent) {
    let kind = event_kind(&event);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("page closed, dropping {}", kind);
        }
        _ = tx.send(event) => {}
    }
}

fn event_kind(event: &DataEvent) -> &'static str {
    match event {
        DataEvent::AnimationTick => "animation tick",
        DataEvent::RefreshTick => "refresh tick",
        DataEvent::NodesUpdated(_) => "node list",
        DataEvent::FetchError { .. } => "fetch error",
        DataEvent::NodeSaveResult { .. } => "save result",
    }
}

/// Fetch the node list once and send the outcome
pub fn spawn_node_fetch(
    tasks: &TaskTracker,
    api: Arc<dyn NodeApi>,
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tasks.spawn(async move {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = api.fetch_nodes() => result,
        };

        let event = match result {
            Ok(response) => DataEvent::NodesUpdated(response),
            Err(e) => {
                tracing::warn!(error = %e, "node fetch failed");
                DataEvent::FetchError {
                    source: DataSource::Nodes,
                    error: e.to_string(),
                }
            }
        };
        deliver(&tx, &cancel, event).await;
    })
}

/// Run a create/update request and send the outcome
pub fn spawn_node_save(
    tasks: &TaskTracker,
    api: Arc<dyn NodeApi>,
    save_id: u64,
    submission: Submission,
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tasks.spawn(async move {
        let request = async {
            match &submission {
                Submission::Create(draft) => api
                    .create_node(draft)
                    .await
                    .map(|node| format!("Added node {}", node.name)),
                Submission::Update { name, draft } => api
                    .update_node(name, draft)
                    .await
                    .map(|_| format!("Updated node {}", name)),
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = request => result,
        };

        let event = match result {
            Ok(message) => {
                tracing::info!("{}", message);
                DataEvent::NodeSaveResult {
                    save_id,
                    success: true,
                    message,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "node save failed");
                DataEvent::NodeSaveResult {
                    save_id,
                    success: false,
                    message: format!("{}: {}", DataSource::Save, e),
                }
            }
        };
        deliver(&tx, &cancel, event).await;
    })
}

/// Spawn the periodic refresh ticker
pub fn spawn_refresh_ticker(
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    backoff: Arc<RefreshBackoff>,
    base_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = backoff.interval(base_interval);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {
                    // A full channel already holds a pending tick or result
                    if tx.try_send(DataEvent::RefreshTick).is_err() {
                        tracing::debug!("refresh tick skipped, data channel full");
                    }
                }
            }
        }
    })
}

/// Spawn the animation tick task
pub fn spawn_animation_tick(
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    animation_visible: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ANIMATION_TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if animation_visible.load(Ordering::Relaxed) {
                        let _ = tx.try_send(DataEvent::AnimationTick);
                    }
                }
            }
        }
    })
}

/// Run the main TUI event loop
///
/// Returns the app so the caller can tear the page down.
pub async fn run_event_loop(
    mut app: App,
    mut input_rx: mpsc::Receiver<InputEvent>,
    mut data_rx: mpsc::Receiver<DataEvent>,
    animation_visible: Arc<AtomicBool>,
    mut render_fn: impl FnMut(&mut App) -> Result<()>,
) -> Result<App> {
    let mut needs_render = true;

    loop {
        if needs_render {
            render_fn(&mut app)?;
            needs_render = false;
        }
        animation_visible.store(app.page.is_loading(), Ordering::Relaxed);

        if !app.running {
            break;
        }

        tokio::select! {
            biased;

            Some(input) = input_rx.recv() => {
                match app.handle_input(input) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            Some(data) = data_rx.recv() => {
                match app.handle_data(data) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            else => break,
        }
    }

    Ok(app)
}

/// Create the dual channels for the TUI
pub fn create_channels() -> (
    mpsc::Sender<InputEvent>,
    mpsc::Receiver<InputEvent>,
    mpsc::Sender<DataEvent>,
    mpsc::Receiver<DataEvent>,
) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let (data_tx, data_rx) = mpsc::channel(DATA_CHANNEL_CAPACITY);
    (input_tx, input_rx, data_tx, data_rx)
}
