//! Child-process invocation seam.
//!
//! Every build step (compile, check gate, generator) funnels through here:
//! a command, a working directory, exported variables, captured output. The
//! pipeline never interprets tool output beyond the exit code, and the
//! generator's stdout-as-content.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Captured outcome of a build-step process. A non-zero exit is not an
/// error at this layer; callers map it into their own failure variant.
#[derive(Debug, Clone)]
pub struct StepOutput {
  pub code: Option<i32>,
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
}

impl StepOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  pub fn stdout_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stdout).into_owned()
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }
}

/// Run a shell command template with the given variables exported.
pub async fn run_shell(cmd: &str, cwd: &Path, vars: &[(&str, &Path)]) -> std::io::Result<StepOutput> {
  debug!(cmd = %cmd, cwd = ?cwd, "running shell step");

  let mut command = Command::new("/bin/sh");
  command.arg("-c").arg(cmd).current_dir(cwd).stdin(Stdio::null());
  for (name, value) in vars {
    command.env(name, value);
  }

  let output = command.output().await?;
  Ok(StepOutput {
    code: output.status.code(),
    stdout: output.stdout,
    stderr: output.stderr,
  })
}

/// Run an argv-style command with one appended positional argument.
pub async fn run_argv(argv: &[String], positional: &Path, cwd: &Path) -> std::io::Result<StepOutput> {
  let Some((program, args)) = argv.split_first() else {
    return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"));
  };
  debug!(program = %program, positional = ?positional, "running argv step");

  let output = Command::new(program)
    .args(args)
    .arg(positional)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .output()
    .await?;

  Ok(StepOutput {
    code: output.status.code(),
    stdout: output.stdout,
    stderr: output.stderr,
  })
}

/// Run a shell command under a deadline. Returns `None` when the deadline
/// expires; the child is killed rather than left orphaned.
pub async fn run_shell_with_timeout(cmd: &str, cwd: &Path, limit: Duration) -> std::io::Result<Option<StepOutput>> {
  debug!(cmd = %cmd, limit = ?limit, "running shell step with deadline");

  let child = Command::new("/bin/sh")
    .arg("-c")
    .arg(cmd)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()?;

  match tokio::time::timeout(limit, child.wait_with_output()).await {
    Ok(output) => {
      let output = output?;
      Ok(Some(StepOutput {
        code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
      }))
    }
    // Dropping the output future kills and reaps the child.
    Err(_) => Ok(None),
  }
}
