// src/exec/process.rs

//! Shell command runner used by command-backed collaborators
//! (external transpilers, stylesheet compilers, linters).

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::session::CancelToken;

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Build a shell command appropriate for the platform.
fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` through the shell in `cwd`, optionally feeding `stdin`.
///
/// If `cancel` fires first the child is killed and an error is returned.
pub async fn run_shell(
    cmd: &str,
    cwd: &Path,
    stdin: Option<&[u8]>,
    envs: &[(&str, String)],
    cancel: &CancelToken,
) -> Result<ProcessOutput> {
    debug!(cmd, cwd = ?cwd, "spawning process");

    let mut command = shell(cmd);
    command
        .current_dir(cwd)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in envs {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for '{cmd}'"))?;

    // Feed stdin from its own task so a child that writes before it has
    // read all of its input cannot deadlock against us.
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        let input = input.to_vec();
        let cmd_name = cmd.to_string();
        tokio::spawn(async move {
            if let Err(err) = pipe.write_all(&input).await {
                debug!(cmd = %cmd_name, error = %err, "failed to write process stdin");
            }
            // Dropping the pipe closes stdin so the child sees EOF.
        });
    }

    tokio::select! {
        output = child.wait_with_output() => {
            let output = output.with_context(|| format!("waiting for process '{cmd}'"))?;
            let exit_code = output.status.code().unwrap_or(-1);
            debug!(cmd, exit_code, success = output.status.success(), "process exited");
            Ok(ProcessOutput {
                success: output.status.success(),
                exit_code,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        _ = cancel.cancelled() => {
            // The child is killed when the `wait_with_output` future drops.
            info!(cmd, "cancellation requested; killing process");
            Err(anyhow!("process '{cmd}' cancelled"))
        }
    }
}

/// Quote a path for inclusion in a shell command line.
pub fn shell_quote(arg: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
