use crate::render::protocol::{FetchCommand, FetchResponse};
use crate::source::SourceGuard;
use tokio::sync::mpsc::{Receiver, Sender};

/// Serve poll requests from the control loop until told to stop.
///
/// The worker owns the source exclusively. It runs on a blocking thread
/// (`tokio::task::spawn_blocking`) because a real source may block inside `poll`.
/// However the loop ends, the source is released once and `Released` is the last
/// response sent.
pub fn fetch_worker_loop(
    mut rx: Receiver<FetchCommand>,
    tx: Sender<FetchResponse>,
    mut source: SourceGuard,
) {
    while let Some(cmd) = rx.blocking_recv() {
        let outcome = handle_command(&mut source, cmd);
        if let Some(response) = outcome.response {
            if tx.blocking_send(response).is_err() {
                break;
            }
        }

        if outcome.done {
            break;
        }
    }

    if let Err(err) = source.release() {
        log::warn!("releasing event source failed: {}", err);
    }
    let _ = tx.blocking_send(FetchResponse::Released);
}

fn handle_command(source: &mut SourceGuard, cmd: FetchCommand) -> HandlerOutcome {
    match cmd {
        FetchCommand::Poll { request_id } => match source.poll() {
            Ok(records) => {
                if !records.is_empty() {
                    log::trace!("poll {} returned {} records", request_id, records.len());
                }
                HandlerOutcome::respond(FetchResponse::Batch {
                    request_id,
                    records,
                    exhausted: source.is_exhausted(),
                })
            }
            Err(error) => {
                log::error!("poll {} failed: {}", request_id, error);
                HandlerOutcome::respond(FetchResponse::Failed { request_id, error })
            }
        },
        FetchCommand::Shutdown => HandlerOutcome::exit(),
    }
}

struct HandlerOutcome {
    response: Option<FetchResponse>,
    done: bool,
}

impl HandlerOutcome {
    fn respond(response: FetchResponse) -> Self {
        Self {
            response: Some(response),
            done: false,
        }
    }

    fn exit() -> Self {
        Self {
            response: None,
            done: true,
        }
    }
}
