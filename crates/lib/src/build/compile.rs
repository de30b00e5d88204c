//! Compiled artifacts.
//!
//! The compile command is an arbitrary shell template supplied by the
//! caller; it reads the materialized content from `$src` and must write its
//! output to `$out`. Compilation failures are deterministic for the same
//! inputs and are never retried.

use std::path::Path;

use tracing::{debug, info};

use crate::build::BuildResult;
use crate::consts::SCRATCH_OUT;
use crate::error::WriteError;
use crate::exec::{StepOutput, run_shell};
use crate::platform::WriterEnv;
use crate::spec::CompileConfig;

/// Build a compiled artifact in the scratch directory.
///
/// After a successful compile, binaries get the platform's post-link fixup
/// pass (when required) and then optionally have their debug symbols
/// stripped, in that order.
pub async fn build_compile(
  config: &CompileConfig,
  content_path: &Path,
  scratch: &Path,
  env: &WriterEnv,
) -> Result<BuildResult, WriteError> {
  let out_path = scratch.join(SCRATCH_OUT);
  info!(cmd = %config.command, "compiling artifact");

  let output = run_shell(
    &config.command,
    scratch,
    &[("src", content_path), ("out", out_path.as_path())],
  )
  .await?;
  if !output.success() {
    return Err(compile_failed(&config.command, &output));
  }
  if !out_path.exists() {
    return Err(WriteError::CompileFailed {
      cmd: config.command.clone(),
      code: output.code,
      stdout: output.stdout_lossy(),
      stderr: "compile command exited 0 but wrote nothing to $out\n".to_string(),
    });
  }

  if env.capabilities.requires_post_link_fixup
    && let Some(fixup) = &env.post_link_fixup
  {
    debug!(cmd = %fixup, "running post-link fixup");
    let output = run_shell(fixup, scratch, &[("out", out_path.as_path())]).await?;
    if !output.success() {
      return Err(compile_failed(fixup, &output));
    }
  }

  if config.strip {
    let cmd = format!("{} \"$out\"", config.strip_command);
    debug!(cmd = %cmd, "stripping debug symbols");
    let output = run_shell(&cmd, scratch, &[("out", out_path.as_path())]).await?;
    if !output.success() {
      return Err(compile_failed(&cmd, &output));
    }
  }

  info!(out = ?out_path, "compiled artifact built");
  Ok(BuildResult { scratch_path: out_path })
}

fn compile_failed(cmd: &str, output: &StepOutput) -> WriteError {
  WriteError::CompileFailed {
    cmd: cmd.to_string(),
    code: output.code,
    stdout: output.stdout_lossy(),
    stderr: output.stderr_lossy(),
  }
}
