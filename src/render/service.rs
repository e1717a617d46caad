//! Poll loop state machine.
//!
//! Mediates between input actions, fetch worker responses and the view. Nothing here
//! blocks or touches channels directly: every handler mutates the view state and tells the
//! caller what to do next, so the loop in [`crate::app`] stays a thin `select!`.

use crate::decode::{decode, preview};
use crate::input::InputAction;
use crate::render::protocol::{FetchCommand, FetchResponse, RequestId};
use crate::render::ui::ViewState;

/// Longest slice of a malformed record written to the log.
const LOG_PREVIEW_CHARS: usize = 200;

/// `Uninitialized` until the first terminal size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    #[default]
    Uninitialized,
    Ready,
}

/// What the loop should do after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Nothing visible changed.
    Idle,
    /// Draw a new frame.
    Redraw,
    /// Release the source and exit.
    Quit,
    /// The worker released the source; nothing further will arrive.
    Finished,
}

/// Running totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub polls: u64,
    pub records: usize,
    pub decoded: usize,
    pub malformed: usize,
}

/// Tracks loop state that persists across ticks, input actions and worker responses.
#[derive(Debug, Default)]
pub struct RenderLoopState {
    phase: LoopPhase,
    next_request_id: RequestId,
    outstanding: Option<RequestId>,
    stats: IngestStats,
}

impl RenderLoopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Request id of the poll still waiting for a response.
    pub fn outstanding(&self) -> Option<RequestId> {
        self.outstanding
    }

    /// Command to send for this tick. At most one poll is in flight at a time, and
    /// nothing is polled before the view is ready.
    pub fn on_tick(&mut self) -> Option<FetchCommand> {
        if self.phase != LoopPhase::Ready || self.outstanding.is_some() {
            return None;
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.outstanding = Some(request_id);
        self.stats.polls += 1;
        Some(FetchCommand::Poll { request_id })
    }

    pub fn process_action(&mut self, action: InputAction, view: &mut ViewState) -> LoopControl {
        match action {
            InputAction::Resize { width, height } => {
                view.update_terminal_size(width, height);
                if self.phase == LoopPhase::Uninitialized {
                    log::debug!("terminal size known ({}x{}), loop ready", width, height);
                    self.phase = LoopPhase::Ready;
                }
                return LoopControl::Redraw;
            }
            InputAction::Quit => return LoopControl::Quit,
            _ if self.phase != LoopPhase::Ready => return LoopControl::Idle,
            InputAction::Scroll { direction, rows } => view.store.move_selection(direction.delta(rows)),
            InputAction::NextPage => view.store.next_page(),
            InputAction::PrevPage => view.store.prev_page(),
            InputAction::GoToTop => view.store.goto_top(),
            InputAction::GoToBottom => view.store.goto_bottom(),
            InputAction::StartFilter => view.store.start_filter(),
            InputAction::FilterInput(ch) => {
                let mut query = view.store.filter_state().query().unwrap_or_default().to_string();
                query.push(ch);
                view.store.set_filter_query(query);
            }
            InputAction::FilterBackspace => {
                let mut query = view.store.filter_state().query().unwrap_or_default().to_string();
                query.pop();
                view.store.set_filter_query(query);
            }
            InputAction::ApplyFilter => view.store.apply_filter(),
            InputAction::CancelFilter => view.store.clear_filter(),
            InputAction::ClearFilter => {
                if !view.store.filter_state().is_filtered() {
                    return LoopControl::Idle;
                }
                view.store.clear_filter();
            }
            InputAction::NoAction | InputAction::InvalidInput => return LoopControl::Idle,
        }
        LoopControl::Redraw
    }

    pub fn handle_response(&mut self, response: FetchResponse, view: &mut ViewState) -> LoopControl {
        if let Some(request_id) = response.request_id() {
            if self.outstanding == Some(request_id) {
                self.outstanding = None;
            }
        }

        match response {
            FetchResponse::Batch {
                records, exhausted, ..
            } => {
                let mut control = self.ingest(records, view);
                if view.status_line.message.is_some() {
                    // The source answered again; an earlier poll failure is stale.
                    view.status_line.clear_message();
                    control = LoopControl::Redraw;
                }
                if exhausted && !view.status_line.stream_ended {
                    log::info!(
                        "event source exhausted after {} records",
                        self.stats.records
                    );
                    view.status_line.stream_ended = true;
                    control = LoopControl::Redraw;
                }
                control
            }
            FetchResponse::Failed { error, .. } => {
                view.status_line.set_message(error.to_string());
                LoopControl::Redraw
            }
            FetchResponse::Released => LoopControl::Finished,
        }
    }

    /// Decode a batch in order and append the successes. Malformed records are logged and
    /// counted; they never stop the rest of the batch.
    fn ingest(&mut self, records: Vec<String>, view: &mut ViewState) -> LoopControl {
        let mut items = Vec::with_capacity(records.len());
        for raw in records.iter().filter(|raw| !raw.trim().is_empty()) {
            self.stats.records += 1;
            match decode(raw) {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.stats.malformed += 1;
                    log::warn!(
                        "skipping malformed record: {}: {}",
                        err,
                        preview(raw, LOG_PREVIEW_CHARS)
                    );
                }
            }
        }

        view.status_line.malformed = self.stats.malformed;
        if records.is_empty() {
            return LoopControl::Idle;
        }

        let appended = view.store.append_batch(items);
        self.stats.decoded += appended;
        LoopControl::Redraw
    }
}
