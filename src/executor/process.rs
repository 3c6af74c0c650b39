//! Child process boundary: fork a body, join on it, sweep finished children.

use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use crate::error::{ExecError, INTERNAL_ERROR_STATUS};

/// How a child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Exited(i32),
    Signaled(Signal),
}

impl ProcessStatus {
    /// Normalized exit status: the exit code, or 128 + the signal number.
    pub fn code(&self) -> i32 {
        match self {
            ProcessStatus::Exited(code) => *code,
            ProcessStatus::Signaled(signal) => 128 + *signal as i32,
        }
    }

    pub fn success(&self) -> bool {
        *self == ProcessStatus::Exited(0)
    }

    fn from_wait(status: WaitStatus) -> Option<(Pid, ProcessStatus)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ProcessStatus::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => Some((pid, ProcessStatus::Signaled(signal))),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug)]
pub struct ChildHandle {
    pid: Pid,
}

impl ChildHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Block until the child terminates.
    pub fn wait(self) -> Result<ProcessStatus, ExecError> {
        loop {
            match waitpid(self.pid, None) {
                Ok(status) => {
                    if let Some((_, status)) = ProcessStatus::from_wait(status) {
                        debug!("child {} finished with {}", self.pid, status);
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ExecError::sys("waitpid", e)),
            }
        }
    }
}

/// Run `body` in a new child process that exits with the returned code.
pub fn spawn<F>(body: F) -> Result<ChildHandle, ExecError>
where
    F: FnOnce() -> i32,
{
    // Buffered output would otherwise be written twice.
    flush_std();

    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            restore_default_signals();
            let code = panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or(INTERNAL_ERROR_STATUS);
            exit_child(code)
        }
        Ok(ForkResult::Parent { child }) => {
            debug!("forked child {}", child);
            Ok(ChildHandle { pid: child })
        }
        Err(e) => {
            debug!("fork failed: {}", e);
            Err(ExecError::sys("fork", e))
        }
    }
}

/// Terminate a forked child without returning to the caller's frames.
pub fn exit_child(code: i32) -> ! {
    flush_std();
    std::process::exit(code)
}

/// Collect every child that has already terminated, without blocking.
pub fn reap_finished() -> Vec<(Pid, ProcessStatus)> {
    let mut finished = Vec::new();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                if let Some(entry) = ProcessStatus::from_wait(status) {
                    debug!("reaped child {} ({})", entry.0, entry.1);
                    finished.push(entry);
                }
            }
            Err(Errno::EINTR) => continue,
            // ECHILD: nothing left to collect.
            Err(_) => break,
        }
    }
    finished
}

/// The Rust runtime starts with SIGPIPE ignored, and an ignored signal stays
/// ignored across `execve`. Children get the default back so a writer into
/// a closed pipe dies quietly.
fn restore_default_signals() {
    if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        debug!("cannot reset SIGPIPE: {}", e);
    }
}

fn flush_std() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}
