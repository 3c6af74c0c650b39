use std::io::Write;
use log::debug;
use nix::errno::Errno;
use nix::unistd::{chdir, getcwd};
use crate::environment::Environment;
use crate::executor::ExecStatus;
use crate::executor::builtin::dir_stack::DirStack;
use crate::executor::builtin::manager::{BuiltinCommand, BuiltinContext};

/// Change directory and keep `PWD` in sync. Returns the new working directory.
fn change_dir(target: &str, env: &mut Environment) -> Result<String, Errno> {
    chdir(target)?;
    let cwd = getcwd()?.to_string_lossy().into_owned();
    env.set_pwd(&cwd);
    Ok(cwd)
}

fn current_dir() -> Result<String, Errno> {
    Ok(getcwd()?.to_string_lossy().into_owned())
}

/// `<cwd> <top> ... <bottom>`
fn print_stack(out: &mut dyn Write, cwd: &str, dirs: &DirStack) -> std::io::Result<()> {
    write!(out, "{}", cwd)?;
    for dir in dirs.iter() {
        write!(out, " {}", dir)?;
    }
    writeln!(out)
}

fn report(ctx: &mut BuiltinContext, op: &str, target: &str, errno: Errno) -> ExecStatus {
    debug!("{} {} failed: {}", op, target, errno);
    writeln!(ctx.err, "{}: {}: {}", op, target, errno.desc())?;
    Ok(errno as i32)
}

pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext) -> ExecStatus {
        let target = match args {
            [] => match ctx.home_dir() {
                Some(home) => home,
                None => {
                    writeln!(ctx.err, "cd: HOME not set")?;
                    return Ok(1);
                }
            },
            [dir] => dir.clone(),
            _ => return ctx.usage("cd OR cd <directory-name>"),
        };
        match change_dir(&target, ctx.env) {
            Ok(_) => Ok(0),
            Err(e) => report(ctx, "cd", &target, e),
        }
    }
}

pub struct PushdCommand;

impl BuiltinCommand for PushdCommand {
    fn name(&self) -> &'static str {
        "pushd"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext) -> ExecStatus {
        let [target] = args else {
            return ctx.usage("pushd <directory-name>");
        };
        let previous = match current_dir() {
            Ok(dir) => dir,
            Err(e) => return report(ctx, "pushd", "getcwd", e),
        };
        match change_dir(target, ctx.env) {
            Ok(cwd) => {
                ctx.dirs.push(previous);
                print_stack(ctx.out, &cwd, ctx.dirs)?;
                Ok(0)
            }
            Err(e) => report(ctx, "pushd", target, e),
        }
    }
}

pub struct PopdCommand;

impl BuiltinCommand for PopdCommand {
    fn name(&self) -> &'static str {
        "popd"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext) -> ExecStatus {
        if !args.is_empty() {
            return ctx.usage("popd");
        }
        let Some(top) = ctx.dirs.pop() else {
            writeln!(ctx.err, "popd: Empty directory stack")?;
            return Ok(1);
        };
        match change_dir(&top, ctx.env) {
            Ok(cwd) => {
                print_stack(ctx.out, &cwd, ctx.dirs)?;
                Ok(0)
            }
            Err(e) => {
                // Leave the stack as it was.
                ctx.dirs.push(top.clone());
                report(ctx, "popd", &top, e)
            }
        }
    }
}
