pub mod manager;
pub mod commands;
pub mod dir_stack;

pub use manager::{BuiltinCommand, BuiltinContext, BuiltinManager};
pub use dir_stack::DirStack;
