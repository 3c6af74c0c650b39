use std::collections::HashMap;
use std::io::Write;
use log::debug;
use crate::environment::Environment;
use crate::error::ExecError;
use crate::executor::ExecStatus;
use crate::executor::builtin::commands::{CdCommand, PopdCommand, PushdCommand};
use crate::executor::builtin::dir_stack::DirStack;

/// Shell state a builtin may read or mutate. Builtins run in the calling
/// process, so every change here is visible to later commands.
pub struct BuiltinContext<'a> {
    pub env: &'a mut Environment,
    pub dirs: &'a mut DirStack,
    /// Configured target of a bare `cd`; `$HOME` when absent.
    pub home: Option<&'a str>,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl BuiltinContext<'_> {
    pub fn home_dir(&self) -> Option<String> {
        self.home
            .map(|h| h.to_string())
            .or_else(|| self.env.get("HOME").map(|h| h.to_string()))
    }

    /// Report wrong usage; the status is always 1.
    pub fn usage(&mut self, synopsis: &str) -> ExecStatus {
        writeln!(self.err, "{}", ExecError::Usage(synopsis.to_string()))?;
        Ok(1)
    }
}

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    /// `args` excludes the command name.
    fn run(&self, args: &[String], ctx: &mut BuiltinContext) -> ExecStatus;
}

pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(CdCommand));
        mgr.register(Box::new(PushdCommand));
        mgr.register(Box::new(PopdCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn execute(
        &self,
        name: &str,
        args: &[String],
        ctx: &mut BuiltinContext,
    ) -> ExecStatus {
        if let Some(cmd) = self.commands.get(name) {
            debug!("builtin {} {:?}", name, args);
            cmd.run(args, ctx)
        } else {
            Err(ExecError::NoSuchBuiltin(name.to_string()))
        }
    }
}

impl Default for BuiltinManager {
    fn default() -> Self {
        BuiltinManager::new()
    }
}
