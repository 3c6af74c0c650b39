use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use log::debug;
use nix::unistd::execve;
use crate::ast::{AstNode, Redirection, SimpleCommand};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::ExecError;
use crate::executor::{ Executor, ExecStatus };
use super::builtin::{BuiltinContext, BuiltinManager, DirStack};
use super::path_resolver::PathResolver;
use super::process;
use super::redirect::RedirectHandler;

/// Evaluates command trees by forking real processes.
pub struct DefaultExecutor {
    pub(super) config: Config,
    builtin_registry: BuiltinManager,
    path_resolver: PathResolver,
    dirs: DirStack,
    /// Nesting of `exec` calls; zero outside any evaluation.
    depth: usize,
    /// Job notices: `Backgrounded: <pid>` and `Completed: <pid> (<status>)`.
    pub(super) notices: Box<dyn Write>,
}

impl Executor for DefaultExecutor {
    fn exec(&mut self, node: &AstNode, env: &mut Environment) -> ExecStatus {
        Ok(self.evaluate(node, env)?.unwrap_or(0))
    }
}

impl DefaultExecutor {
    pub fn new(config: Config) -> Self {
        DefaultExecutor {
            config,
            builtin_registry: BuiltinManager::new(),
            path_resolver: PathResolver,
            dirs: DirStack::new(),
            depth: 0,
            notices: Box::new(io::stderr()),
        }
    }

    /// Send job notices somewhere other than stderr.
    pub fn with_notices(mut self, notices: Box<dyn Write>) -> Self {
        self.notices = notices;
        self
    }

    /// Evaluate `node`. `None` means only background units were launched,
    /// so there is no foreground status to record.
    pub fn evaluate(&mut self, node: &AstNode, env: &mut Environment) -> Result<Option<i32>, ExecError> {
        self.depth += 1;
        let result = self.dispatch(node, env);
        self.depth -= 1;
        if self.depth == 0 {
            self.reap_zombies();
        }
        result
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dir_stack(&self) -> &DirStack {
        &self.dirs
    }

    pub fn builtins_mut(&mut self) -> &mut BuiltinManager {
        &mut self.builtin_registry
    }

    fn dispatch(&mut self, node: &AstNode, env: &mut Environment) -> Result<Option<i32>, ExecError> {
        let status = match node {
            AstNode::Simple(cmd) => self.exec_command(cmd, env)?,
            AstNode::Pipe(left, right) => self.exec_pipeline(left, right, env)?,
            AstNode::And(left, right) => {
                let status = self.exec(left, env)?;
                let status = if status == 0 { self.exec(right, env)? } else { status };
                env.set_last_status(status);
                status
            }
            AstNode::Or(left, right) => {
                let status = self.exec(left, env)?;
                let status = if status != 0 { self.exec(right, env)? } else { status };
                env.set_last_status(status);
                status
            }
            AstNode::SequentialEnd(..) | AstNode::Background(..) => {
                return self.exec_sequence(node, env, false);
            }
            AstNode::Subshell { body, redirect } => self.exec_subshell(body, redirect, env)?,
        };
        Ok(Some(status))
    }

    fn exec_command(&mut self, cmd: &SimpleCommand, env: &mut Environment) -> ExecStatus {
        if cmd.name().is_none() {
            env.set_last_status(0);
            return Ok(0);
        }

        // Built-in command execution
        if self.builtin_registry.is_builtin(&cmd.argv[0]) {
            let (mut out, mut err) = (io::stdout(), io::stderr());
            let status = self.exec_builtin(cmd, env, &mut out, &mut err)?;
            env.set_last_status(status);
            return Ok(status);
        }

        // External command execution
        let child = process::spawn(|| self.exec_external(cmd, env))?;
        let status = child.wait()?.code();
        env.set_last_status(status);
        Ok(status)
    }

    /// Run a builtin in this process. A write failure on its output only
    /// fails the command.
    fn exec_builtin(
        &mut self,
        cmd: &SimpleCommand,
        env: &mut Environment,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ExecStatus {
        let mut ctx = BuiltinContext {
            env,
            dirs: &mut self.dirs,
            home: self.config.home.as_deref(),
            out,
            err,
        };
        match self.builtin_registry.execute(&cmd.argv[0], &cmd.argv[1..], &mut ctx) {
            Err(ExecError::Io(e)) => {
                debug!("{}: output failed: {}", cmd.argv[0], e);
                let _ = writeln!(ctx.err, "{}: {}: {}", self.config.shell_name, cmd.argv[0], e);
                Ok(e.raw_os_error().unwrap_or(1))
            }
            result => result,
        }
    }

    /// Child side of a simple command. Only returns when the program could
    /// not be started.
    fn exec_external(&self, cmd: &SimpleCommand, env: &mut Environment) -> i32 {
        // The bindings die with this child.
        for (name, value) in &cmd.locals {
            env.set_exported(name, value);
        }
        if let Err(e) = RedirectHandler::apply(&cmd.redirect) {
            return self.report(&e);
        }
        let e = self.replace_image(cmd, env);
        self.report(&e)
    }

    fn replace_image(&self, cmd: &SimpleCommand, env: &Environment) -> ExecError {
        let name = &cmd.argv[0];
        let search_path = self
            .config
            .search_path
            .as_deref()
            .or_else(|| env.get("PATH"))
            .unwrap_or_default();
        let Some(path) = self.path_resolver.resolve(name, search_path) else {
            return ExecError::CommandNotFound(name.clone());
        };

        let program = match CString::new(path.as_os_str().as_bytes()) {
            Ok(p) => p,
            Err(_) => return ExecError::InvalidArgument(name.clone()),
        };
        let argv = match cmd.argv.iter().map(|a| CString::new(a.as_str())).collect::<Result<Vec<_>, _>>() {
            Ok(argv) => argv,
            Err(_) => return ExecError::InvalidArgument(cmd.argv.join(" ")),
        };
        let envp: Vec<CString> = env
            .exported_vars()
            .into_iter()
            .filter_map(|(k, v)| CString::new(format!("{}={}", k, v)).ok())
            .collect();

        match execve(&program, &argv, &envp) {
            Ok(never) => match never {},
            Err(errno) => ExecError::Exec {
                program: name.clone(),
                errno,
            },
        }
    }

    fn exec_subshell(&mut self, body: &AstNode, redirect: &Redirection, env: &mut Environment) -> ExecStatus {
        let child = process::spawn(|| {
            if let Err(e) = RedirectHandler::apply(redirect) {
                return self.report(&e);
            }
            self.exec_in_child(body, env)
        })?;
        let status = child.wait()?.code();
        env.set_last_status(status);
        Ok(status)
    }

    /// Evaluate `node` as the whole body of a forked child and produce its
    /// exit status.
    pub(super) fn exec_in_child(&mut self, node: &AstNode, env: &mut Environment) -> i32 {
        match self.exec(node, env) {
            Ok(status) => status,
            Err(e) => self.report(&e),
        }
    }

    /// Print `<shell>: <error>` and return the status to exit with.
    pub(super) fn report(&self, e: &ExecError) -> i32 {
        debug!("child failed: {}", e);
        eprintln!("{}: {}", self.config.shell_name, e);
        e.code()
    }

    fn reap_zombies(&mut self) {
        for (pid, status) in process::reap_finished() {
            debug!("background child {} completed", pid);
            let _ = writeln!(self.notices, "Completed: {} ({})", pid, status);
        }
        let _ = self.notices.flush();
    }
}
