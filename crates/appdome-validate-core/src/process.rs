//! Execution of the validation engine subprocess.
//!
//! The engine's stdout and stderr are drained on reader threads so a chatty
//! engine cannot fill a pipe and stall. Every line is echoed live (to our
//! stderr, keeping stdout free for the run summary) and captured for
//! classification once the process has exited.
//!
//! The wait is sliced so an optional timeout and a [`CancelToken`] can both
//! interrupt it; in either case the child is killed and reaped. The same
//! deadline bounds the output drain after exit.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::ExecutionError;

/// How long a single wait slice lasts before timeout/cancel are rechecked.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cooperative cancellation shared between the host and a running
/// validation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The shared flag, for hosts that raise it from a signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Everything needed to launch one subprocess.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    /// Program followed by its arguments.
    pub argv: &'a [String],
    pub cwd: &'a Path,
    /// Added on top of the inherited environment.
    pub envs: &'a [(&'a str, &'a str)],
    pub timeout: Option<Duration>,
}

/// Result of a process that ran to exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// stdout and stderr lines, in the order they were read.
    pub lines: Vec<String>,
}

pub trait ProcessRunner {
    fn run(
        &self,
        request: &RunRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<ProcessOutput, ExecutionError>;
}

/// Runs processes directly (no shell) on the host.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    echo: bool,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self { echo: true }
    }
}

impl SystemRunner {
    /// A runner that captures output without echoing it.
    pub fn quiet() -> Self {
        Self { echo: false }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        request: &RunRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<ProcessOutput, ExecutionError> {
        let Some((program, args)) = request.argv.split_first() else {
            return Err(ExecutionError::Spawn(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty argv",
            )));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(request.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in request.envs {
            cmd.env(key, value);
        }

        debug!(program = %program, cwd = %request.cwd.display(), "spawning engine");
        let mut child = cmd.spawn().map_err(ExecutionError::Spawn)?;

        // Readers are detached; the channel disconnects once both are done.
        let (tx, rx) = mpsc::channel();
        for pipe in [
            child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
            child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        ]
        .into_iter()
        .flatten()
        {
            let tx = tx.clone();
            let echo = self.echo;
            thread::spawn(move || pump_lines(pipe, echo, tx));
        }
        drop(tx);

        let deadline = request.timeout.map(|t| Instant::now() + t);
        let waited = loop {
            if cancel.is_cancelled() {
                break Err(ExecutionError::Interrupted);
            }
            let slice = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break Err(ExecutionError::TimedOut {
                            timeout_secs: request.timeout.unwrap_or_default().as_secs(),
                        });
                    }
                    remaining.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            match child.wait_timeout(slice) {
                Ok(Some(status)) => break Ok(status),
                Ok(None) => continue,
                Err(e) => break Err(ExecutionError::Wait(e)),
            }
        };

        let status = match waited {
            Ok(status) => status,
            Err(err) => {
                warn!("stopping validation engine: {err}");
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        Ok(ProcessOutput {
            exit_code: status.code(),
            lines: collect_lines(&rx, deadline, cancel),
        })
    }
}

/// Drains captured lines after the child exited.
///
/// A background process left behind by the engine can hold the pipes open
/// indefinitely, so the drain stops at the run deadline or on cancellation
/// and keeps whatever arrived until then.
fn collect_lines(
    rx: &mpsc::Receiver<String>,
    deadline: Option<Instant>,
    cancel: &CancelToken,
) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        if cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
            lines.extend(rx.try_iter());
            warn!("engine output still open after exit, ignoring the rest");
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => lines.push(line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    lines
}

fn pump_lines(pipe: Box<dyn Read + Send>, echo: bool, tx: mpsc::Sender<String>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if echo {
                    let _ = writeln!(io::stderr().lock(), "{line}");
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}
