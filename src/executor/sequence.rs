use std::io::Write;
use log::debug;
use crate::ast::AstNode;
use crate::environment::Environment;
use crate::error::ExecError;
use crate::executor::Executor;
use super::default_executor::DefaultExecutor;
use super::process;

impl DefaultExecutor {
    /// Chains of `;` and `&`. A separator applies to the command on its
    /// left; `background_right` is set when this node is itself the left
    /// operand of a `&`, which sends its rightmost command to the
    /// background.
    ///
    /// Returns the status of the last foreground command, if any ran.
    pub(super) fn exec_sequence(
        &mut self,
        node: &AstNode,
        env: &mut Environment,
        background_right: bool,
    ) -> Result<Option<i32>, ExecError> {
        let (left, right, background) = match node {
            AstNode::SequentialEnd(left, right) => (left, right, false),
            AstNode::Background(left, right) => (left, right, true),
            other => return self.exec(other, env).map(Some),
        };

        let mut status = if left.is_sequence() {
            self.exec_sequence(left, env, background)?
        } else if background {
            self.launch_background(left, env)?;
            None
        } else {
            Some(self.exec(left, env)?)
        };

        if let Some(right) = right {
            if background_right {
                self.launch_background(right, env)?;
            } else {
                status = Some(self.exec(right, env)?);
            }
        }
        Ok(status)
    }

    /// Start `node` in a child that nobody waits for; the reaper collects it.
    fn launch_background(&mut self, node: &AstNode, env: &mut Environment) -> Result<(), ExecError> {
        let child = process::spawn(|| self.exec_in_child(node, env))?;
        debug!("background {} started for {}", child.pid(), node.kind());
        let _ = writeln!(self.notices, "Backgrounded: {}", child.pid());
        let _ = self.notices.flush();
        Ok(())
    }
}
