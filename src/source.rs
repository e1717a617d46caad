//! Event sources: where raw records come from.
//!
//! The trace engine itself is an external collaborator. The viewer only needs something it
//! can poll for whatever records have arrived since the last call, and release once at exit.
//!
//! - [`StreamSource`] frames records from any byte stream (stdin, a file, a FIFO) on a
//!   dedicated reader thread, so polling never blocks.
//! - [`CommandSource`] spawns the engine as a child process and reads its stdout.

pub mod command;
pub mod stream;

pub use command::CommandSource;
pub use stream::StreamSource;

use crate::error::{LttviewError, Result};
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

/// Pull-based source of raw text records.
pub trait EventSource: Send {
    /// Return the records that arrived since the last poll, possibly none.
    ///
    /// Must return promptly when nothing is available.
    fn poll(&mut self) -> Result<Vec<String>>;

    /// Release the underlying connection. Called exactly once, through [`SourceGuard`].
    fn release(&mut self) -> Result<()>;

    /// True once the source will never produce another record.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// How a byte stream is cut into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum RecordFraming {
    /// One record per line (NDJSON)
    #[default]
    Lines,
    /// Concatenated JSON values, pretty-printed or not
    Json,
}

impl FromStr for RecordFraming {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" => Ok(RecordFraming::Lines),
            "json" => Ok(RecordFraming::Json),
            other => Err(format!(
                "unknown framing '{other}' (expected 'lines' or 'json')"
            )),
        }
    }
}

impl fmt::Display for RecordFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFraming::Lines => f.write_str("lines"),
            RecordFraming::Json => f.write_str("json"),
        }
    }
}

/// Where to read events from, as chosen on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Stdin,
    File(PathBuf),
    Command { program: String, args: Vec<String> },
}

impl SourceSpec {
    /// Establish the connection. Failure here is fatal for the viewer.
    pub fn open(&self, framing: RecordFraming) -> Result<Box<dyn EventSource>> {
        match self {
            SourceSpec::Stdin => open_stdin(framing, std::io::stdin().is_terminal()),
            SourceSpec::File(path) => Ok(Box::new(StreamSource::open_file(path, framing)?)),
            SourceSpec::Command { program, args } => {
                Ok(Box::new(CommandSource::spawn(program, args, framing)?))
            }
        }
    }

    /// Short label for the title bar.
    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Stdin => "stdin".to_string(),
            SourceSpec::File(path) => path.display().to_string(),
            SourceSpec::Command { program, .. } => program.clone(),
        }
    }
}

/// Stdin is only a source when something is piped into it; an interactive terminal
/// belongs to the key reader.
fn open_stdin(framing: RecordFraming, interactive: bool) -> Result<Box<dyn EventSource>> {
    if interactive {
        return Err(LttviewError::SourceUnavailable {
            message: "stdin is a terminal; pipe events in, pass a file, or use --exec".to_string(),
            source: None,
        });
    }
    Ok(Box::new(StreamSource::stdin(framing)))
}

/// Owns a source and guarantees it is released exactly once.
pub struct SourceGuard {
    source: Option<Box<dyn EventSource>>,
}

impl SourceGuard {
    pub fn new(source: Box<dyn EventSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Poll the source; a released guard yields nothing.
    pub fn poll(&mut self) -> Result<Vec<String>> {
        match self.source.as_mut() {
            Some(source) => source.poll(),
            None => Ok(Vec::new()),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.source
            .as_ref()
            .map_or(true, |source| source.is_exhausted())
    }

    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// Release the source. Later calls are no-ops.
    pub fn release(&mut self) -> Result<()> {
        match self.source.take() {
            Some(mut source) => {
                log::debug!("releasing event source");
                source.release()
            }
            None => Ok(()),
        }
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("failed to release event source: {}", err);
        }
    }
}

impl fmt::Debug for SourceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceGuard")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Map an IO failure while opening a source.
pub(crate) fn unavailable(what: impl fmt::Display, err: std::io::Error) -> LttviewError {
    LttviewError::source_unavailable(format!("{what}: {err}"), err)
}
