use crate::ast::AstNode;
use crate::environment::Environment;
use crate::error::ExecError;

/// Exit status of an evaluated tree, or a resource error that stops the engine.
pub type ExecStatus = Result<i32, ExecError>;

pub trait Executor {
    fn exec(&mut self, node: &AstNode, env: &mut Environment) -> ExecStatus;
}
