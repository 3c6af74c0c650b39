use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct PathResolver;

impl PathResolver {
    /// Locate `command` on `search_path` (a `:`-separated directory list).
    /// Names containing `/` are returned untouched so `execve` reports why
    /// they cannot run.
    pub fn resolve(&self, command: &str, search_path: &str) -> Option<PathBuf> {
        if command.contains('/') {
            return Some(PathBuf::from(command));
        }

        env::split_paths(search_path)
            .map(|dir| dir.join(command))
            .find(|path| is_executable(path))
    }
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
