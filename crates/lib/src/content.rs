//! Content materialization.
//!
//! Build steps always receive a filesystem path to the payload, whether the
//! spec carried literal text or a file reference. Bytes are never
//! transformed in either direction; interpreters with whitespace-sensitive
//! dialects depend on the content arriving verbatim.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::consts::SCRATCH_SRC;
use crate::error::WriteError;
use crate::spec::ArtifactSource;

/// Materialize an artifact's payload into the scratch directory.
///
/// Inline text is persisted to a private scratch file; a file reference is
/// passed through unchanged. The `Generated` variant never reaches this
/// function; the generator pipeline produces its content itself.
pub async fn materialize(source: &ArtifactSource, scratch: &Path) -> Result<PathBuf, WriteError> {
  match source {
    ArtifactSource::Inline(text) => materialize_inline(text.as_bytes(), scratch).await,
    ArtifactSource::File(path) => Ok(path.clone()),
    ArtifactSource::Generated(_) => Err(WriteError::InvalidSpec(
      "generated content is materialized by the generator pipeline".to_string(),
    )),
  }
}

/// Persist inline bytes verbatim to `scratch/src`, readable only by the
/// owning user.
pub async fn materialize_inline(bytes: &[u8], scratch: &Path) -> Result<PathBuf, WriteError> {
  let path = scratch.join(SCRATCH_SRC);

  let mut options = tokio::fs::OpenOptions::new();
  options.write(true).create_new(true);
  #[cfg(unix)]
  options.mode(0o600);

  let mut file = options.open(&path).await?;
  file.write_all(bytes).await?;
  file.flush().await?;

  debug!(path = ?path, bytes = bytes.len(), "materialized inline content");
  Ok(path)
}
