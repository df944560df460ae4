use crate::RuntimeError;
use quberneeds_schema::Environment;
use std::ffi::OsStr;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Run `program args...` to completion with `env` layered over the inherited
/// environment. Stdio is inherited so the tool's own output reaches the
/// console. A nonzero exit becomes [`RuntimeError::CommandFailed`].
pub fn run<I, S>(program: &str, args: I, env: &Environment) -> Result<(), RuntimeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.envs(env.iter());

    let command = render(&cmd);
    debug!("running {command}");

    let status = cmd.status().map_err(|source| RuntimeError::Spawn {
        command: command.clone(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        let code = exit_code(status);
        debug!("{command} failed with {code}");
        Err(RuntimeError::CommandFailed { command, code })
    }
}

/// The code to report for a failed child. A child killed by a signal has no
/// exit code; it is reported the way shells do, as 128 plus the signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

fn render(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}
