use std::os::unix::io::AsRawFd;
use log::debug;
use nix::unistd::{close, dup2, pipe};
use crate::ast::AstNode;
use crate::config::PipelineStatus;
use crate::environment::Environment;
use crate::error::ExecError;
use crate::executor::ExecStatus;
use super::default_executor::DefaultExecutor;
use super::process;

impl DefaultExecutor {
    /// `left | right`: each side runs as its own child; the parent never
    /// touches the channel.
    pub(super) fn exec_pipeline(
        &mut self,
        left: &AstNode,
        right: &AstNode,
        env: &mut Environment,
    ) -> ExecStatus {
        let (read_end, write_end) = pipe().map_err(|e| ExecError::sys("pipe", e))?;
        let (read_fd, write_fd) = (read_end.as_raw_fd(), write_end.as_raw_fd());

        let left_child = process::spawn(|| {
            if let Err(e) = dup2(write_fd, libc::STDOUT_FILENO) {
                return self.report(&ExecError::sys("dup2", e));
            }
            let _ = close(read_fd);
            let _ = close(write_fd);
            self.exec_in_child(left, env)
        })?;

        let right_child = process::spawn(|| {
            if let Err(e) = dup2(read_fd, libc::STDIN_FILENO) {
                return self.report(&ExecError::sys("dup2", e));
            }
            let _ = close(read_fd);
            let _ = close(write_fd);
            self.exec_in_child(right, env)
        })?;

        // Both ends must be closed here or the reader never sees EOF.
        drop(read_end);
        drop(write_end);
        debug!("pipeline {} | {}", left_child.pid(), right_child.pid());

        let right_status = right_child.wait()?.code();
        let left_status = left_child.wait()?.code();
        let status = combine(self.config.pipeline_status, left_status, right_status);
        env.set_last_status(status);
        Ok(status)
    }
}

fn combine(policy: PipelineStatus, left: i32, right: i32) -> i32 {
    match policy {
        PipelineStatus::RightmostNonzero if right == 0 => left,
        PipelineStatus::RightmostNonzero | PipelineStatus::Rightmost => right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SimpleCommand;
    use crate::config::ConfigLoader;
    use crate::executor::Executor;
    use crate::test_support::{serial, read, path_str};

    fn executor(policy: PipelineStatus) -> DefaultExecutor {
        let mut config = ConfigLoader::default_config();
        config.pipeline_status = policy;
        DefaultExecutor::new(config)
    }

    #[test]
    fn test_combine_policies() {
        use PipelineStatus::*;
        assert_eq!(combine(RightmostNonzero, 1, 0), 1);
        assert_eq!(combine(RightmostNonzero, 1, 2), 2);
        assert_eq!(combine(RightmostNonzero, 0, 0), 0);
        assert_eq!(combine(Rightmost, 1, 0), 0);
        assert_eq!(combine(Rightmost, 0, 3), 3);
    }

    #[test]
    fn test_right_side_sees_exact_bytes() {
        let _guard = serial();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("count.txt");
        let mut exec = executor(PipelineStatus::RightmostNonzero);
        let mut env = Environment::new();

        let node = AstNode::pipe(
            AstNode::simple(&["printf", "%s", "ab"]),
            SimpleCommand::new(&["wc", "-c"]).with_output(path_str(&out)).into_node(),
        );
        assert_eq!(exec.exec(&node, &mut env).unwrap(), 0);
        assert_eq!(read(&out).trim(), "2");
        assert_eq!(env.last_status(), Some(0));
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let _guard = serial();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("lines.txt");
        let mut exec = executor(PipelineStatus::RightmostNonzero);
        let mut env = Environment::new();

        let node = AstNode::pipe(
            AstNode::simple(&["seq", "1", "200000"]),
            SimpleCommand::new(&["wc", "-l"]).with_output(path_str(&out)).into_node(),
        );
        assert_eq!(exec.exec(&node, &mut env).unwrap(), 0);
        assert_eq!(read(&out).trim(), "200000");
    }

    #[test]
    fn test_nested_pipeline() {
        let _guard = serial();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sorted.txt");
        let mut exec = executor(PipelineStatus::RightmostNonzero);
        let mut env = Environment::new();

        // printf 'c\na\nb\n' | sort | head -n 2
        let node = AstNode::pipe(
            AstNode::pipe(
                AstNode::simple(&["printf", "c\\na\\nb\\n"]),
                AstNode::simple(&["sort"]),
            ),
            SimpleCommand::new(&["head", "-n", "2"]).with_output(path_str(&out)).into_node(),
        );
        assert_eq!(exec.exec(&node, &mut env).unwrap(), 0);
        assert_eq!(read(&out), "a\nb\n");
    }

    #[test]
    fn test_status_policies_on_real_processes() {
        let _guard = serial();
        let mut env = Environment::new();
        let left_fails = AstNode::pipe(AstNode::simple(&["false"]), AstNode::simple(&["true"]));
        let right_fails = AstNode::pipe(
            AstNode::simple(&["true"]),
            AstNode::simple(&["sh", "-c", "exit 3"]),
        );

        let mut exec = executor(PipelineStatus::RightmostNonzero);
        assert_eq!(exec.exec(&left_fails, &mut env).unwrap(), 1);
        assert_eq!(env.last_status(), Some(1));
        assert_eq!(exec.exec(&right_fails, &mut env).unwrap(), 3);

        let mut exec = executor(PipelineStatus::Rightmost);
        assert_eq!(exec.exec(&left_fails, &mut env).unwrap(), 0);
        assert_eq!(exec.exec(&right_fails, &mut env).unwrap(), 3);
    }

    #[test]
    fn test_writer_dies_quietly_when_reader_exits() {
        let _guard = serial();
        let dir = tempfile::tempdir().unwrap();
        let err = dir.path().join("yes.err");
        let out = dir.path().join("head.out");
        let mut exec = executor(PipelineStatus::RightmostNonzero);
        let mut env = Environment::new();

        // yes 2>yes.err | head -c 1 > head.out
        let script = format!("yes 2>{}", path_str(&err));
        let node = AstNode::pipe(
            AstNode::simple(&["sh", "-c", script.as_str()]),
            SimpleCommand::new(&["head", "-c", "1"]).with_output(path_str(&out)).into_node(),
        );
        assert_eq!(exec.exec(&node, &mut env).unwrap(), 141);
        assert_eq!(read(&out), "y");
        assert_eq!(read(&err), "");
    }

    #[test]
    fn test_builtin_inside_pipeline_does_not_leak() {
        let _guard = serial();
        let cwd = std::env::current_dir().unwrap();
        let mut exec = executor(PipelineStatus::RightmostNonzero);
        let mut env = Environment::new();

        let node = AstNode::pipe(AstNode::simple(&["cd", "/"]), AstNode::simple(&["true"]));
        assert_eq!(exec.exec(&node, &mut env).unwrap(), 0);
        assert_eq!(std::env::current_dir().unwrap(), cwd);
    }
}
