use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration, Instant};

use lttview::fetch::fetch_worker_loop;
use lttview::render::protocol::{FetchCommand, FetchResponse};
use lttview::source::{EventSource, RecordFraming, SourceGuard, StreamSource};
use lttview::Result;

const TIMEOUT_MS: u64 = 500;

async fn next_response(rx: &mut mpsc::Receiver<FetchResponse>) -> FetchResponse {
    timeout(Duration::from_millis(TIMEOUT_MS), rx.recv())
        .await
        .expect("worker response timed out")
        .expect("worker channel closed unexpectedly")
}

/// Replays fixed batches, then reports exhaustion.
struct Replay {
    batches: VecDeque<Vec<String>>,
    releases: Arc<AtomicUsize>,
}

impl Replay {
    fn new(batches: &[&[&str]]) -> (Self, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        let source = Self {
            batches: batches
                .iter()
                .map(|batch| batch.iter().map(|r| r.to_string()).collect())
                .collect(),
            releases: Arc::clone(&releases),
        };
        (source, releases)
    }
}

impl EventSource for Replay {
    fn poll(&mut self) -> Result<Vec<String>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn release(&mut self) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

fn spawn_worker(
    source: impl EventSource + 'static,
) -> (
    mpsc::Sender<FetchCommand>,
    mpsc::Receiver<FetchResponse>,
    tokio::task::JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    let (resp_tx, resp_rx) = mpsc::channel(4);
    let guard = SourceGuard::new(Box::new(source));
    let worker = tokio::task::spawn_blocking(move || fetch_worker_loop(cmd_rx, resp_tx, guard));
    (cmd_tx, resp_rx, worker)
}

async fn poll(
    cmd_tx: &mpsc::Sender<FetchCommand>,
    resp_rx: &mut mpsc::Receiver<FetchResponse>,
    request_id: u64,
) -> (Vec<String>, bool) {
    cmd_tx
        .send(FetchCommand::Poll { request_id })
        .await
        .unwrap();
    match next_response(resp_rx).await {
        FetchResponse::Batch {
            request_id: id,
            records,
            exhausted,
        } => {
            assert_eq!(id, request_id);
            (records, exhausted)
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

async fn shutdown(
    cmd_tx: mpsc::Sender<FetchCommand>,
    mut resp_rx: mpsc::Receiver<FetchResponse>,
    worker: tokio::task::JoinHandle<()>,
) {
    cmd_tx.send(FetchCommand::Shutdown).await.unwrap();
    match next_response(&mut resp_rx).await {
        FetchResponse::Released => {}
        other => panic!("expected release, got {other:?}"),
    }
    worker.await.unwrap();
    assert!(resp_rx.recv().await.is_none());
}

#[tokio::test]
async fn empty_polls_return_empty_batches() {
    let (source, releases) = Replay::new(&[&[], &[], &["late"]]);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker(source);

    assert_eq!(poll(&cmd_tx, &mut resp_rx, 1).await, (vec![], false));
    assert_eq!(poll(&cmd_tx, &mut resp_rx, 2).await, (vec![], false));
    assert_eq!(
        poll(&cmd_tx, &mut resp_rx, 3).await,
        (vec!["late".to_string()], true)
    );

    shutdown(cmd_tx, resp_rx, worker).await;
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn batches_preserve_arrival_order() {
    let (source, _) = Replay::new(&[&["a", "b"], &["c"], &["d", "e", "f"]]);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker(source);

    let mut seen = Vec::new();
    for id in 0..3 {
        seen.extend(poll(&cmd_tx, &mut resp_rx, id).await.0);
    }
    assert_eq!(seen, vec!["a", "b", "c", "d", "e", "f"]);

    shutdown(cmd_tx, resp_rx, worker).await;
}

#[tokio::test]
async fn shutdown_mid_stream_releases_once() {
    let (source, releases) = Replay::new(&[&["a"], &["b"], &["c"]]);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker(source);

    assert_eq!(poll(&cmd_tx, &mut resp_rx, 7).await.0, vec!["a"]);
    shutdown(cmd_tx, resp_rx, worker).await;

    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn closed_command_channel_still_releases() {
    let (source, releases) = Replay::new(&[&["a"]]);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker(source);

    drop(cmd_tx);
    match next_response(&mut resp_rx).await {
        FetchResponse::Released => {}
        other => panic!("expected release, got {other:?}"),
    }
    worker.await.unwrap();
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn file_source_delivers_every_line_then_ends() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    std::fs::write(
        file.path(),
        "{\"name\":\"a\",\"payload\":{}}\n\n{\"name\":\"b\",\"payload\":{}}\n",
    )
    .expect("write contents");
    let source = StreamSource::open_file(file.path(), RecordFraming::Lines).expect("open file");
    let (cmd_tx, mut resp_rx, worker) = spawn_worker(source);

    let deadline = Instant::now() + Duration::from_millis(TIMEOUT_MS);
    let mut records = Vec::new();
    let mut request_id = 0;
    loop {
        let (batch, exhausted) = poll(&cmd_tx, &mut resp_rx, request_id).await;
        records.extend(batch);
        if exhausted {
            break;
        }
        assert!(Instant::now() < deadline, "file source never ended");
        request_id += 1;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(
        records,
        vec![
            r#"{"name":"a","payload":{}}"#.to_string(),
            r#"{"name":"b","payload":{}}"#.to_string(),
        ]
    );
    shutdown(cmd_tx, resp_rx, worker).await;
}
