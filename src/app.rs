//! Application orchestration layer
//!
//! Wires the event source, the fetch worker, the input thread and the renderer together.
//! The loop owns the view state; the worker owns the source; input arrives on its own
//! thread. Everything meets in one `select!` so a slow source never stalls key handling.

pub mod runtime;

use crate::config::ViewerConfig;
use crate::error::{LttviewError, Result};
use crate::fetch::fetch_worker_loop;
use crate::input::InputAction;
use crate::render::protocol::{FetchCommand, FetchResponse};
use crate::render::service::{LoopControl, RenderLoopState};
use crate::render::ui::{UIRenderer, ViewState};
use crate::source::{EventSource, SourceGuard};
use runtime::spawn_input_thread;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;

const WORKER_CHANNEL_CAPACITY: usize = 16;
/// How long to wait for the worker to confirm the source was released.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Application orchestrator
pub struct Application {
    config: ViewerConfig,
    ui_renderer: Box<dyn UIRenderer>,
    source: Option<Box<dyn EventSource>>,
    source_label: String,
}

impl Application {
    /// The source must already be open; startup failures are reported before the
    /// terminal switches to raw mode.
    pub fn new(
        config: ViewerConfig,
        source: Box<dyn EventSource>,
        source_label: impl Into<String>,
        ui_renderer: Box<dyn UIRenderer>,
    ) -> Self {
        Self {
            config,
            ui_renderer,
            source: Some(source),
            source_label: source_label.into(),
        }
    }

    /// Run the viewer until the user quits. The terminal is restored on every exit path.
    pub async fn run(&mut self) -> Result<()> {
        self.ui_renderer.initialize()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let input_thread = spawn_input_thread(
            input_tx,
            Arc::clone(&shutdown),
            self.config.input_poll_interval(),
        );

        let result = self.drive(input_rx).await;

        shutdown.store(true, Ordering::SeqCst);
        if input_thread.join().is_err() {
            log::error!("input thread panicked");
        }
        let cleanup = self.ui_renderer.cleanup();

        let view = result?;
        log::info!(
            "session ended with {} events ({} malformed skipped)",
            view.store.len(),
            view.status_line.malformed
        );
        cleanup
    }

    /// Poll loop: input, worker responses and ticks until quit. Returns the final view.
    pub async fn drive(&mut self, mut input_rx: UnboundedReceiver<InputAction>) -> Result<ViewState> {
        let source = self
            .source
            .take()
            .ok_or_else(|| LttviewError::other("event source already consumed"))?;
        log::info!("viewing {}", self.source_label);

        let (cmd_tx, cmd_rx) = mpsc::channel::<FetchCommand>(WORKER_CHANNEL_CAPACITY);
        let (resp_tx, mut resp_rx) = mpsc::channel::<FetchResponse>(WORKER_CHANNEL_CAPACITY);
        let guard = SourceGuard::new(source);
        let worker =
            tokio::task::spawn_blocking(move || fetch_worker_loop(cmd_rx, resp_tx, guard));

        let mut view = ViewState::new(&self.config, self.source_label.clone());
        let mut state = RenderLoopState::new();

        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = self
            .poll_loop(&mut state, &mut view, &mut input_rx, &mut resp_rx, &cmd_tx, &mut ticker)
            .await;

        // Release the source whether the loop quit or failed.
        let _ = cmd_tx.send(FetchCommand::Shutdown).await;
        drop(cmd_tx);
        let drained = tokio::time::timeout(RELEASE_TIMEOUT, async {
            while let Some(response) = resp_rx.recv().await {
                if matches!(response, FetchResponse::Released) {
                    break;
                }
            }
        })
        .await;
        match drained {
            Ok(()) => {
                if let Err(err) = worker.await {
                    log::error!("fetch worker panicked: {}", err);
                }
            }
            Err(_) => log::warn!(
                "event source not released within {:?}; leaving worker behind",
                RELEASE_TIMEOUT
            ),
        }

        let stats = state.stats();
        log::debug!(
            "{} polls, {} records, {} decoded, {} malformed",
            stats.polls,
            stats.records,
            stats.decoded,
            stats.malformed
        );
        outcome.map(|()| view)
    }

    async fn poll_loop(
        &mut self,
        state: &mut RenderLoopState,
        view: &mut ViewState,
        input_rx: &mut UnboundedReceiver<InputAction>,
        resp_rx: &mut mpsc::Receiver<FetchResponse>,
        cmd_tx: &mpsc::Sender<FetchCommand>,
        ticker: &mut tokio::time::Interval,
    ) -> Result<()> {
        let (width, height) = self.ui_renderer.get_terminal_size()?;
        state.process_action(InputAction::Resize { width, height }, view);
        self.ui_renderer.render(view)?;

        loop {
            let control = tokio::select! {
                biased;
                action = input_rx.recv() => match action {
                    Some(action) => state.process_action(action, view),
                    None => {
                        log::debug!("input channel closed");
                        LoopControl::Quit
                    }
                },
                response = resp_rx.recv() => match response {
                    Some(response) => state.handle_response(response, view),
                    None => LoopControl::Finished,
                },
                _ = ticker.tick() => match state.on_tick() {
                    Some(command) => {
                        if cmd_tx.send(command).await.is_err() {
                            LoopControl::Finished
                        } else {
                            LoopControl::Idle
                        }
                    }
                    None => LoopControl::Idle,
                },
            };

            match control {
                LoopControl::Idle => {}
                LoopControl::Redraw => self.ui_renderer.render(view)?,
                LoopControl::Quit => return Ok(()),
                LoopControl::Finished => {
                    log::warn!("fetch worker stopped before quit");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ui::MockUIRenderer;
    use crate::source::tests::ScriptedSource;

    fn config() -> ViewerConfig {
        ViewerConfig {
            tick_interval_ms: 1,
            ..ViewerConfig::default()
        }
    }

    #[tokio::test]
    async fn quit_releases_source_once_and_keeps_records() {
        let source = ScriptedSource::new(vec![
            vec![r#"{"name":"open","payload":{"fd":3}}"#],
            vec![],
            vec!["not json", r#"{"name":"close","payload":{"fd":3}}"#],
        ]);
        let releases = Arc::clone(&source.releases);
        let mut app = Application::new(
            config(),
            Box::new(source),
            "scripted",
            Box::new(MockUIRenderer::new()),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let quitter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send(InputAction::Quit);
        });

        let view = app.drive(rx).await.unwrap();
        quitter.await.unwrap();

        let titles: Vec<&str> = view.store.items().iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["open", "close"]);
        assert_eq!(view.status_line.malformed, 1);
        assert!(view.status_line.stream_ended);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_input_channel_ends_session() {
        let source = ScriptedSource::new(vec![]);
        let releases = Arc::clone(&source.releases);
        let mut app = Application::new(
            config(),
            Box::new(source),
            "scripted",
            Box::new(MockUIRenderer::new()),
        );

        let (tx, rx) = mpsc::unbounded_channel::<InputAction>();
        drop(tx);
        let view = app.drive(rx).await.unwrap();

        assert!(view.store.is_empty());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_can_only_be_driven_once() {
        let mut app = Application::new(
            config(),
            Box::new(ScriptedSource::new(vec![])),
            "scripted",
            Box::new(MockUIRenderer::new()),
        );
        let (_tx, rx) = mpsc::unbounded_channel::<InputAction>();
        let (tx2, rx2) = mpsc::unbounded_channel::<InputAction>();
        drop(tx2);
        app.drive(rx2).await.unwrap();
        assert!(app.drive(rx).await.is_err());
    }
}
