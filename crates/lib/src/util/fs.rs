//! Small filesystem helpers shared across the pipeline.

use std::path::Path;

/// Mark a file executable.
#[cfg(unix)]
pub async fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

/// Mark a file executable (no-op off unix; execution rights come from the
/// file extension there).
#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}

/// Create a symlink at `link` pointing to `target`.
#[cfg(unix)]
pub async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  tokio::fs::symlink(target, link).await
}

/// Create a symlink at `link` pointing to `target`.
#[cfg(windows)]
pub async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  tokio::fs::symlink_file(target, link).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[tokio::test]
  #[cfg(unix)]
  async fn make_executable_sets_exec_bits() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().unwrap();
    let path = temp.path().join("tool");
    tokio::fs::write(&path, "#!/bin/sh\n").await.unwrap();

    make_executable(&path).await.unwrap();

    let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn symlink_resolves_to_target() {
    let temp = tempdir().unwrap();
    let target = temp.path().join("real");
    tokio::fs::write(&target, "bytes").await.unwrap();

    let link = temp.path().join("alias");
    symlink(&target, &link).await.unwrap();

    assert_eq!(tokio::fs::read(&link).await.unwrap(), b"bytes");
  }
}
