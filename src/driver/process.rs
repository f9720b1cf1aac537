//! Child process execution.
//!
//! The driver only talks to [`ProcessRunner`]; [`SystemRunner`] is the real one.

use log::debug;
use std::fmt;
use std::io;
use std::process::ExitStatus;

use super::command::CommandLine;
use crate::diagnostic::DiagnosticLevel;

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// positive exit status
    Failed(i32),
    /// killed by the given signal
    Signaled(i32),
    /// the wait was interrupted from the keyboard
    Interrupted,
}

impl Outcome {
    /// Negative codes mean termination by signal.
    pub fn from_return_code(code: i32) -> Self {
        match code {
            0 => Outcome::Success,
            c if c < 0 => Outcome::Signaled(-c),
            c => Outcome::Failed(c),
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::from_return_code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Outcome::Signaled(signal);
            }
        }
        Outcome::Failed(1)
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }

    /// Severity used when reporting the end of an interactive child
    pub fn level(self) -> DiagnosticLevel {
        match self {
            Outcome::Success => DiagnosticLevel::Info,
            Outcome::Failed(_) => DiagnosticLevel::Warning,
            Outcome::Signaled(_) | Outcome::Interrupted => DiagnosticLevel::Error,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "exited normally"),
            Outcome::Failed(code) => write!(f, "returned exit status {}", code),
            Outcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
            Outcome::Interrupted => write!(f, "terminated by interrupt"),
        }
    }
}

/// Result of a child whose output was captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub outcome: Outcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn success() -> Self {
        Self::with_output(Outcome::Success, "", "")
    }

    pub fn with_output(outcome: Outcome, stdout: &str, stderr: &str) -> Self {
        Self {
            outcome,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }
}

/// Launches child processes, one at a time, blocking until each exits.
pub trait ProcessRunner {
    /// Run with stdout and stderr captured.
    fn capture(&mut self, cmd: &CommandLine) -> io::Result<Captured>;

    /// Run with the terminal handed over to the child.
    fn interactive(&mut self, cmd: &CommandLine) -> io::Result<Outcome>;
}

/// Runs real processes
#[derive(Debug)]
pub struct SystemRunner {
    _private: (),
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemRunner {
    pub fn new() -> Self {
        interrupt::install();
        Self { _private: () }
    }
}

/// A failed wait during which SIGINT arrived counts as an interrupt.
fn settle(outcome: Outcome) -> Outcome {
    if interrupt::take() && !outcome.is_success() {
        Outcome::Interrupted
    } else {
        outcome
    }
}

impl ProcessRunner for SystemRunner {
    fn capture(&mut self, cmd: &CommandLine) -> io::Result<Captured> {
        debug!("capturing: {}", cmd);
        interrupt::clear();
        let output = cmd.to_command().output()?;
        let outcome = settle(Outcome::from_status(output.status));
        debug!("{} {}", cmd.program, outcome);
        Ok(Captured {
            outcome,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn interactive(&mut self, cmd: &CommandLine) -> io::Result<Outcome> {
        debug!("handing terminal to: {}", cmd);
        interrupt::clear();
        let status = cmd.to_command().status()?;
        Ok(settle(Outcome::from_status(status)))
    }
}

mod interrupt {
    use std::sync::Once;
    use std::sync::atomic::{AtomicBool, Ordering};

    static INTERRUPTED: AtomicBool = AtomicBool::new(false);
    static INSTALL: Once = Once::new();

    #[cfg(unix)]
    extern "C" fn on_sigint(_signal: libc::c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    /// Children get the default disposition back on exec.
    #[cfg(unix)]
    pub fn install() {
        INSTALL.call_once(|| unsafe {
            libc::signal(libc::SIGINT, on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t);
        });
    }

    #[cfg(not(unix))]
    pub fn install() {
        INSTALL.call_once(|| {});
    }

    pub fn clear() {
        INTERRUPTED.store(false, Ordering::SeqCst);
    }

    pub fn take() -> bool {
        INTERRUPTED.swap(false, Ordering::SeqCst)
    }
}
