//! Event source that runs the trace engine as a child process.

use crate::error::{LttviewError, Result};
use crate::source::{unavailable, EventSource, RecordFraming, StreamSource};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// How long a freshly spawned engine gets to fail before the connection counts as made.
const STARTUP_GRACE: Duration = Duration::from_millis(150);

/// Reads records from the stdout of a spawned command.
pub struct CommandSource {
    program: String,
    child: Child,
    stream: StreamSource,
}

impl CommandSource {
    /// Spawn `program` and wait briefly for an immediate failure, such as a refused
    /// connection, which is reported as [`LttviewError::SourceUnavailable`].
    pub fn spawn(program: &str, args: &[String], framing: RecordFraming) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(format!("cannot start '{program}'"), e))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LttviewError::SourceUnavailable {
                    message: format!("'{program}' has no stdout"),
                    source: None,
                });
            }
        };

        let stream = StreamSource::from_reader(stdout, framing, program);
        let mut source = Self {
            program: program.to_string(),
            child,
            stream,
        };
        source.confirm_started(STARTUP_GRACE)?;
        log::info!("started '{}' (pid {})", source.program, source.child.id());
        Ok(source)
    }

    fn confirm_started(&mut self, grace: Duration) -> Result<()> {
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            match self.child.try_wait()? {
                Some(status) if !status.success() => {
                    return Err(LttviewError::SourceUnavailable {
                        message: format!("'{}' exited with {}", self.program, status),
                        source: None,
                    });
                }
                Some(_) => return Ok(()),
                None => std::thread::sleep(Duration::from_millis(10)),
            }
        }
        Ok(())
    }
}

impl EventSource for CommandSource {
    fn poll(&mut self) -> Result<Vec<String>> {
        self.stream.poll()
    }

    /// Kill and reap the child. Its descendants may still hold the pipe open, so the
    /// reader thread is detached rather than joined; it ends once the last writer exits.
    fn release(&mut self) -> Result<()> {
        drop(self.stream.detach());
        if self.child.try_wait()?.is_none() {
            log::debug!("killing '{}'", self.program);
            if let Err(err) = self.child.kill() {
                if err.kind() != std::io::ErrorKind::InvalidInput {
                    return Err(err.into());
                }
            }
        }
        let status = self.child.wait()?;
        log::info!("'{}' finished with {}", self.program, status);
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.stream.is_exhausted()
    }
}
