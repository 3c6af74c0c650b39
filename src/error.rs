use std::fmt;
use std::io;
use nix::errno::Errno;

/// Status returned for a node the dispatcher cannot interpret. Not a
/// process exit code.
pub const INTERNAL_ERROR_STATUS: i32 = -1;

#[derive(Debug)]
pub enum ExecError {
    CommandNotFound(String),
    Io(io::Error),
    /// A failed system call, named by the operation that issued it.
    Sys {
        op: &'static str,
        errno: Errno,
    },
    /// Replacing the program image failed.
    Exec {
        program: String,
        errno: Errno,
    },
    /// A redirection target could not be opened.
    Open {
        path: String,
        source: io::Error,
    },
    InvalidArgument(String),
    NoSuchBuiltin(String),
    Usage(String),
}

impl ExecError {
    pub fn sys(op: &'static str, errno: Errno) -> Self {
        ExecError::Sys { op, errno }
    }

    /// Exit status a child reports when it dies from this error.
    pub fn code(&self) -> i32 {
        match self {
            ExecError::Io(e) => e.raw_os_error().unwrap_or(1),
            ExecError::Sys { errno, .. } | ExecError::Exec { errno, .. } => *errno as i32,
            ExecError::Open { source, .. } => source.raw_os_error().unwrap_or(1),
            ExecError::CommandNotFound(_) => Errno::ENOENT as i32,
            ExecError::InvalidArgument(_) => Errno::EINVAL as i32,
            ExecError::NoSuchBuiltin(_) | ExecError::Usage(_) => 1,
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::CommandNotFound(cmd) => write!(f, "{}: command not found", cmd),
            ExecError::Io(e) => write!(f, "IO error: {}", e),
            ExecError::Sys { op, errno } => write!(f, "{}: {}", op, errno.desc()),
            ExecError::Exec { program, errno } => write!(f, "{}: {}", program, errno.desc()),
            ExecError::Open { path, source } => write!(f, "open: {}: {}", path, source),
            ExecError::InvalidArgument(arg) => write!(f, "Invalid argument: {}", arg),
            ExecError::NoSuchBuiltin(name) => write!(f, "No such builtin command: {}", name),
            ExecError::Usage(msg) => write!(f, "usage: {}", msg),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Io(e) => Some(e),
            ExecError::Sys { errno, .. } | ExecError::Exec { errno, .. } => Some(errno),
            ExecError::Open { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ExecError {
    fn from(e: io::Error) -> Self {
        ExecError::Io(e)
    }
}
