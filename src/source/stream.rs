//! Byte-stream event source backed by a reader thread.

use crate::error::Result;
use crate::source::{unavailable, EventSource, RecordFraming};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::thread::JoinHandle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Upper bound on records handed out by a single poll, so one tick stays short.
pub const MAX_BATCH: usize = 1024;

enum StreamMessage {
    Record(String),
    /// The stream can no longer be framed; no records follow.
    Failed(String),
}

/// Frames records from a byte stream on a dedicated thread.
///
/// Polling drains whatever the thread has produced so far and never waits for more.
pub struct StreamSource {
    rx: UnboundedReceiver<StreamMessage>,
    reader: Option<JoinHandle<()>>,
    label: String,
    exhausted: bool,
}

impl StreamSource {
    /// Start framing `input` in the background.
    pub fn from_reader<R>(input: R, framing: RecordFraming, label: impl Into<String>) -> Self
    where
        R: Read + Send + 'static,
    {
        let label = label.into();
        let (tx, rx) = unbounded_channel();
        let thread_label = label.clone();
        let reader = std::thread::spawn(move || {
            let input = BufReader::new(input);
            match framing {
                RecordFraming::Lines => read_lines(input, &tx),
                RecordFraming::Json => read_json_values(input, &tx),
            }
            log::debug!("reader for {} finished", thread_label);
        });

        Self {
            rx,
            reader: Some(reader),
            label,
            exhausted: false,
        }
    }

    pub fn stdin(framing: RecordFraming) -> Self {
        Self::from_reader(std::io::stdin(), framing, "stdin")
    }

    /// Open a regular file or FIFO. Directories are rejected.
    pub fn open_file(path: &Path, framing: RecordFraming) -> Result<Self> {
        let label = path.display().to_string();
        let metadata = std::fs::metadata(path).map_err(|e| unavailable(&label, e))?;
        if metadata.is_dir() {
            return Err(unavailable(
                &label,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
            ));
        }
        let file = std::fs::File::open(path).map_err(|e| unavailable(&label, e))?;
        Ok(Self::from_reader(file, framing, label))
    }

    /// Detach from the reader thread, returning its handle so the caller may join it once
    /// the underlying stream is closed.
    pub(crate) fn detach(&mut self) -> Option<JoinHandle<()>> {
        self.rx.close();
        self.exhausted = true;
        self.reader.take()
    }
}

impl EventSource for StreamSource {
    fn poll(&mut self) -> Result<Vec<String>> {
        let mut records = Vec::new();
        while records.len() < MAX_BATCH {
            match self.rx.try_recv() {
                Ok(StreamMessage::Record(record)) => records.push(record),
                Ok(StreamMessage::Failed(reason)) => {
                    log::error!("stream {} can no longer be read: {}", self.label, reason);
                    self.exhausted = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.exhausted {
                        log::info!("stream {} ended", self.label);
                    }
                    self.exhausted = true;
                    break;
                }
            }
        }
        Ok(records)
    }

    /// A blocked read cannot be interrupted, so the reader thread is left to exit on its
    /// own at the next record or end of input.
    fn release(&mut self) -> Result<()> {
        drop(self.detach());
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// One record per line. Invalid UTF-8 is replaced rather than ending the stream.
fn read_lines<R: BufRead>(mut input: R, tx: &UnboundedSender<StreamMessage>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(StreamMessage::Record(line.to_string())).is_err() {
                    return;
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => {
                let _ = tx.send(StreamMessage::Failed(err.to_string()));
                return;
            }
        }
    }
}

/// Concatenated JSON values, each re-serialised compactly as one record.
fn read_json_values<R: Read>(input: R, tx: &UnboundedSender<StreamMessage>) {
    let values = serde_json::Deserializer::from_reader(input).into_iter::<Value>();
    for value in values {
        let message = match value {
            Ok(value) => StreamMessage::Record(value.to_string()),
            Err(err) => {
                let _ = tx.send(StreamMessage::Failed(err.to_string()));
                return;
            }
        };
        if tx.send(message).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::time::{Duration, Instant};

    /// Poll until the stream is exhausted, collecting everything it produced.
    fn drain(source: &mut StreamSource) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut out = Vec::new();
        while !source.is_exhausted() && Instant::now() < deadline {
            out.extend(source.poll().unwrap());
            std::thread::sleep(Duration::from_millis(1));
        }
        out
    }

    #[test]
    fn lines_framing_skips_blank_lines() {
        let input = "{\"name\":\"a\"}\n\n  \r\n{\"name\":\"b\"}\r\n{\"name\":\"c\"}";
        let mut source = StreamSource::from_reader(Cursor::new(input), RecordFraming::Lines, "t");
        assert_eq!(
            drain(&mut source),
            vec![r#"{"name":"a"}"#, r#"{"name":"b"}"#, r#"{"name":"c"}"#]
        );
        assert!(source.poll().unwrap().is_empty());
    }

    #[test]
    fn lines_framing_passes_malformed_lines_through() {
        let mut source =
            StreamSource::from_reader(Cursor::new("not json\n"), RecordFraming::Lines, "t");
        assert_eq!(drain(&mut source), vec!["not json"]);
    }

    #[test]
    fn json_framing_splits_pretty_printed_values() {
        let input = "{\n  \"name\": \"open\",\n  \"payload\": {\"fd\": 3}\n}\n{\"name\":\"close\"}";
        let mut source = StreamSource::from_reader(Cursor::new(input), RecordFraming::Json, "t");
        assert_eq!(
            drain(&mut source),
            vec![r#"{"name":"open","payload":{"fd":3}}"#, r#"{"name":"close"}"#]
        );
    }

    #[test]
    fn json_framing_stops_at_garbage() {
        let input = "{\"name\":\"open\"} }{ {\"name\":\"close\"}";
        let mut source = StreamSource::from_reader(Cursor::new(input), RecordFraming::Json, "t");
        assert_eq!(drain(&mut source), vec![r#"{"name":"open"}"#]);
        assert!(source.is_exhausted());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"name\":\"sched_switch\"}}").unwrap();
        writeln!(file, "{{\"name\":\"sched_wakeup\"}}").unwrap();

        let mut source = StreamSource::open_file(file.path(), RecordFraming::Lines).unwrap();
        assert_eq!(drain(&mut source).len(), 2);
    }

    #[test]
    fn directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = StreamSource::open_file(dir.path(), RecordFraming::Lines)
            .err()
            .unwrap();
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn release_marks_exhausted() {
        let mut source = StreamSource::from_reader(Cursor::new(""), RecordFraming::Lines, "t");
        source.release().unwrap();
        assert!(source.is_exhausted());
        assert!(source.poll().unwrap().is_empty());
    }
}
