//! Command gateway — trait + `earbuds` process backend.
//!
//! Every interaction with the earbuds goes through the external `earbuds`
//! utility. [`CommandGateway`] is the seam: the process backend spawns the
//! binary, the [`mock`] backend records calls for tests.

use std::fmt;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

// ── Error type ──

/// Failures invoking the external utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The binary does not exist or is not on `PATH`.
    NotFound(String),
    /// The binary exists but could not be started.
    SpawnFailed(String),
    /// The command did not finish within the timeout (milliseconds).
    Timeout(u64),
    /// The command exited with a failure status.
    NonZeroExit { code: Option<i32>, stderr: String },
    /// The command's stdout was not valid UTF-8 or could not be read.
    InvalidOutput(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound(bin) => write!(f, "earbuds binary not found: {bin}"),
            GatewayError::SpawnFailed(e) => write!(f, "Failed to run earbuds: {e}"),
            GatewayError::Timeout(ms) => write!(f, "earbuds command timed out after {ms} ms"),
            GatewayError::NonZeroExit { code, stderr } => {
                match code {
                    Some(c) => write!(f, "earbuds exited with status {c}")?,
                    None => write!(f, "earbuds was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            GatewayError::InvalidOutput(e) => write!(f, "Invalid earbuds output: {e}"),
        }
    }
}

impl std::error::Error for GatewayError {}

pub type Result<T> = std::result::Result<T, GatewayError>;

// ── Gateway trait ──

/// Runs one `earbuds` subcommand and returns its standard output.
pub trait CommandGateway {
    fn execute(&self, args: &[&str]) -> Result<String>;
}

impl<G: CommandGateway + ?Sized> CommandGateway for &G {
    fn execute(&self, args: &[&str]) -> Result<String> {
        (**self).execute(args)
    }
}

// ── Process backend ──

/// Poll interval when waiting for the child process to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Gateway that spawns the `earbuds` binary for every command.
#[derive(Debug, Clone)]
pub struct EarbudsCli {
    binary: String,
    timeout: Duration,
}

impl EarbudsCli {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Build a gateway from the `earbuds_binary` / `command_timeout_ms` settings.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.earbuds_binary.trim(),
            Duration::from_millis(config.command_timeout_ms),
        )
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandGateway for EarbudsCli {
    fn execute(&self, args: &[&str]) -> Result<String> {
        log::debug!("exec: {} {}", self.binary, args.join(" "));
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GatewayError::NotFound(self.binary.clone()),
                _ => GatewayError::SpawnFailed(format!("{}: {e}", self.binary)),
            })?;

        // Drain both pipes off-thread so a large reply cannot stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, deadline, self.timeout)?;

        if !status.success() {
            let stderr = collect_output(&stderr, deadline, self.timeout).unwrap_or_default();
            return Err(GatewayError::NonZeroExit {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        // A background process spawned by the child can keep stdout open
        // after the child itself has exited.
        collect_output(&stdout, deadline, self.timeout)
    }
}

type Drained = std::io::Result<Vec<u8>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Drained> {
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut p) => {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = tx.send(p.read_to_end(&mut buf).map(|_| buf));
            });
        }
        None => {
            let _ = tx.send(Ok(Vec::new()));
        }
    }
    rx
}

/// Wait for a drained pipe until `deadline`.
fn collect_output(rx: &Receiver<Drained>, deadline: Instant, timeout: Duration) -> Result<String> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    let bytes = match rx.recv_timeout(remaining) {
        Ok(read) => read.map_err(|e| GatewayError::InvalidOutput(e.to_string()))?,
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("earbuds output still open after {timeout:?}, giving up");
            return Err(GatewayError::Timeout(timeout.as_millis() as u64));
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(GatewayError::InvalidOutput("output reader panicked".into()));
        }
    };
    String::from_utf8(bytes).map_err(|e| GatewayError::InvalidOutput(e.to_string()))
}

/// Wait for the child to exit. Kills and reaps it once `deadline` has passed.
fn wait_with_timeout(child: &mut Child, deadline: Instant, timeout: Duration) -> Result<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => break,
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(GatewayError::SpawnFailed(format!("wait failed: {e}"))),
        }
    }

    log::warn!("earbuds command timed out after {timeout:?}, killing");
    let _ = child.kill();
    let _ = child.wait();
    Err(GatewayError::Timeout(timeout.as_millis() as u64))
}

// ── Mock gateway for testing ──

/// In-memory mock gateway for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records every command and answers `status` polls with a settable reply.
    /// Mutating commands succeed with empty output unless `fail_commands` is set.
    pub struct MockGateway {
        /// Recorded calls, one argument vector per command.
        pub calls: RefCell<Vec<Vec<String>>>,
        /// Reply returned for `status` polls.
        pub status_reply: RefCell<String>,
        /// If set, `status` polls fail with this error.
        pub status_error: RefCell<Option<GatewayError>>,
        /// If true, non-status commands fail.
        pub fail_commands: Cell<bool>,
    }

    impl Default for MockGateway {
        fn default() -> Self {
            Self::new("")
        }
    }

    impl MockGateway {
        pub fn new(status_reply: impl Into<String>) -> Self {
            MockGateway {
                calls: RefCell::new(Vec::new()),
                status_reply: RefCell::new(status_reply.into()),
                status_error: RefCell::new(None),
                fail_commands: Cell::new(false),
            }
        }

        /// Replace the reply for subsequent `status` polls.
        pub fn set_status_reply(&self, reply: impl Into<String>) {
            *self.status_reply.borrow_mut() = reply.into();
        }

        /// The most recent call, joined with spaces.
        pub fn last_call(&self) -> Option<String> {
            self.calls.borrow().last().map(|c| c.join(" "))
        }

        /// All calls, joined with spaces.
        pub fn call_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.join(" ")).collect()
        }
    }

    impl CommandGateway for MockGateway {
        fn execute(&self, args: &[&str]) -> Result<String> {
            self.calls
                .borrow_mut()
                .push(args.iter().map(|a| a.to_string()).collect());
            if args.first() == Some(&"status") {
                if let Some(e) = self.status_error.borrow().clone() {
                    return Err(e);
                }
                return Ok(self.status_reply.borrow().clone());
            }
            if self.fail_commands.get() {
                return Err(GatewayError::NonZeroExit {
                    code: Some(1),
                    stderr: "mock: command failure injected".into(),
                });
            }
            Ok(String::new())
        }
    }
}
