use log::{debug, info};
use nix::unistd::getcwd;
use crate::ast::AstNode;
use crate::config::Config;
use crate::environment::Environment;
use crate::executor::builtin::DirStack;
use crate::executor::{DefaultExecutor, ExecStatus};
use crate::logging;

/// One shell session: the process context plus the executor that mutates it.
pub struct Shell {
    executor: DefaultExecutor,
    env: Environment,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        logging::init(config.log_level);

        let mut env = Environment::new();
        for (name, value) in &config.env_vars {
            env.set_exported(name, value);
        }
        match getcwd() {
            Ok(cwd) => env.set_pwd(&cwd.to_string_lossy()),
            Err(e) => debug!("getcwd failed, PWD left as inherited: {}", e),
        }
        info!("{} session started", config.shell_name);

        Shell {
            executor: DefaultExecutor::new(config),
            env,
        }
    }

    /// Evaluate one top-level tree. Background completions are reported
    /// before this returns.
    pub fn run(&mut self, node: &AstNode) -> ExecStatus {
        match self.executor.evaluate(node, &mut self.env)? {
            Some(status) => {
                self.env.set_last_status(status);
                Ok(status)
            }
            // Only background launches: `?` keeps the last foreground status.
            None => Ok(0),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn dir_stack(&self) -> &DirStack {
        self.executor.dir_stack()
    }

    pub fn config(&self) -> &Config {
        self.executor.config()
    }

    pub fn last_status(&self) -> Option<i32> {
        self.env.last_status()
    }
}
