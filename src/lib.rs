pub mod ast;
pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod logging;
pub mod shell;

#[cfg(test)]
mod test_support;

pub use ast::{AstNode, InputRedirect, OutputRedirect, Redirection, SimpleCommand};
pub use config::{Config, ConfigLoader, PipelineStatus};
pub use environment::Environment;
pub use error::ExecError;
pub use executor::{DefaultExecutor, ExecStatus, Executor};
pub use shell::Shell;
