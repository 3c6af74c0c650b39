use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::path::PathBuf;
use log::trace;
use nix::unistd::{dup2, mkstemp, unlink};
use crate::ast::{InputRedirect, OutputRedirect, Redirection};
use crate::error::ExecError;

// rwx for the owner, matching files created by the classic shells.
const CREATE_MODE: u32 = 0o700;

pub struct RedirectHandler;

impl RedirectHandler {
    /// Rebind the calling process's stdin/stdout as declared. Only called in
    /// a child that is about to replace itself or run a subshell body; the
    /// original descriptors are never restored.
    pub fn apply(redirect: &Redirection) -> Result<(), ExecError> {
        match &redirect.output {
            OutputRedirect::None => {}
            OutputRedirect::Truncate(file) => {
                let f = open_output(file, false)?;
                Self::replace_fd(&f, libc::STDOUT_FILENO)?;
                trace!("stdout > {}", file);
            }
            OutputRedirect::Append(file) => {
                let f = open_output(file, true)?;
                Self::replace_fd(&f, libc::STDOUT_FILENO)?;
                trace!("stdout >> {}", file);
            }
        }

        match &redirect.input {
            InputRedirect::None => {}
            InputRedirect::File(file) => {
                let f = File::open(file).map_err(|e| ExecError::Open {
                    path: file.clone(),
                    source: e,
                })?;
                Self::replace_fd(&f, libc::STDIN_FILENO)?;
                trace!("stdin < {}", file);
            }
            InputRedirect::HereDoc(text) => {
                let (f, path) = here_doc(text)?;
                Self::replace_fd(&f, libc::STDIN_FILENO)?;
                // The open descriptor keeps the content alive.
                unlink(path.as_path()).map_err(|e| ExecError::sys("unlink", e))?;
                trace!("stdin << {} bytes", text.len());
            }
        }

        Ok(())
    }

    fn replace_fd(file: &File, target: RawFd) -> Result<(), ExecError> {
        dup2(file.as_raw_fd(), target).map_err(|e| ExecError::sys("dup2", e))?;
        Ok(())
    }
}

fn open_output(file: &str, append: bool) -> Result<File, ExecError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(CREATE_MODE);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options.open(file).map_err(|e| ExecError::Open {
        path: file.to_string(),
        source: e,
    })
}

/// Write `text` to a fresh temporary file and rewind it.
fn here_doc(text: &str) -> Result<(File, PathBuf), ExecError> {
    let template = std::env::temp_dir().join("tiny-shell-heredoc-XXXXXX");
    let (fd, path) = mkstemp(template.as_path()).map_err(|e| ExecError::sys("mkstemp", e))?;
    let mut file = unsafe { File::from_raw_fd(fd) };
    let written = file
        .write_all(text.as_bytes())
        .and_then(|_| file.seek(SeekFrom::Start(0)));
    if let Err(e) = written {
        let _ = unlink(path.as_path());
        return Err(ExecError::Io(e));
    }
    Ok((file, path))
}
