mod executor;
mod default_executor;
mod pipeline;
mod sequence;
mod redirect;
mod path_resolver;
pub mod builtin;
pub mod process;

pub use executor::{Executor, ExecStatus};
pub use crate::error::ExecError;
pub use default_executor::DefaultExecutor;
pub use redirect::RedirectHandler;
pub use path_resolver::PathResolver;
pub use process::{ChildHandle, ProcessStatus};
