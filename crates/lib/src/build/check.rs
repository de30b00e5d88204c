//! Pre-finalization validation gate.

use std::path::Path;

use tracing::debug;

use crate::error::WriteError;
use crate::exec::run_argv;

/// Run a configured check command against the scratch artifact.
///
/// The artifact path is appended as the sole positional argument. Exit 0
/// accepts; anything else aborts the build with the tool's output verbatim.
/// This runs strictly before relocation, so a rejected artifact never
/// reaches the output tree.
pub async fn run_check(argv: &[String], artifact: &Path, scratch: &Path) -> Result<(), WriteError> {
  debug!(check = ?argv, artifact = ?artifact, "running check gate");

  let output = run_argv(argv, artifact, scratch).await?;
  if !output.success() {
    return Err(WriteError::CheckFailed {
      cmd: argv.join(" "),
      code: output.code,
      stdout: output.stdout_lossy(),
      stderr: output.stderr_lossy(),
    });
  }

  debug!(check = ?argv, "check gate accepted artifact");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string(), "--".to_string()]
  }

  #[tokio::test]
  async fn accepting_check_passes() {
    let scratch = tempdir().unwrap();
    let artifact = scratch.path().join("out");
    tokio::fs::write(&artifact, "#!/bin/sh\n").await.unwrap();

    run_check(&["true".to_string()], &artifact, scratch.path()).await.unwrap();
  }

  #[tokio::test]
  async fn rejecting_check_carries_output_verbatim() {
    let scratch = tempdir().unwrap();
    let artifact = scratch.path().join("out");
    tokio::fs::write(&artifact, "#!/bin/sh\n").await.unwrap();

    let result = run_check(&sh("echo bad syntax; echo details >&2; exit 2"), &artifact, scratch.path()).await;

    let Err(WriteError::CheckFailed { code, stdout, stderr, .. }) = result else {
      panic!("expected CheckFailed");
    };
    assert_eq!(code, Some(2));
    assert_eq!(stdout, "bad syntax\n");
    assert_eq!(stderr, "details\n");
  }

  #[tokio::test]
  async fn check_receives_artifact_as_positional() {
    let scratch = tempdir().unwrap();
    let artifact = scratch.path().join("out");
    tokio::fs::write(&artifact, "payload").await.unwrap();

    // The check only succeeds if "$1" names the artifact.
    let argv = vec![
      "sh".to_string(),
      "-c".to_string(),
      "test -f \"$1\"".to_string(),
      "--".to_string(),
    ];
    run_check(&argv, &artifact, scratch.path()).await.unwrap();
  }
}
