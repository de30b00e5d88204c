//! The output tree and artifact relocation.
//!
//! The relocator owns the last filesystem step of a build: moving a raw
//! executable from scratch into its final path. Placement is a single
//! rename wherever the filesystem allows it, so a partially written file is
//! never visible at the final path. A completed move is final; there is no
//! partial undo.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::build::BuildResult;
use crate::consts::BIN_SUBTREE;
use crate::error::WriteError;
use crate::name::ResolvedName;
use crate::util::fs::symlink;

/// Root of the output tree. The core only issues create/rename operations
/// against it; storage and caching mechanics live elsewhere.
#[derive(Debug, Clone)]
pub struct OutputTree {
  root: PathBuf,
}

/// An artifact at its final location. Immutable once placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalArtifact {
  /// Absolute path of the placed executable.
  pub path: PathBuf,
  /// Top-level discoverability symlink, present for bare-name artifacts.
  pub link: Option<PathBuf>,
}

impl OutputTree {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Move a raw executable into its final place, creating parent
  /// directories. Bare-name artifacts additionally get a top-level symlink
  /// pointing at the real file under the `bin/` subtree.
  pub async fn relocate(&self, result: BuildResult, resolved: &ResolvedName) -> Result<FinalArtifact, WriteError> {
    let dest = self.root.join(&resolved.rel_path);
    // All conflict checks run before anything in the tree is touched, so a
    // rejected placement leaves the tree exactly as it was.
    if !resolved.explicit {
      self.check_bare_slot(&resolved.leaf).await?;
    }
    self.clear_destination(&dest, resolved).await?;

    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).await?;
    }
    move_into_place(&result.scratch_path, &dest).await?;

    let link = if resolved.explicit {
      None
    } else {
      Some(self.link_bare_name(&resolved.leaf).await?)
    };

    info!(dest = ?dest, "artifact placed");
    Ok(FinalArtifact { path: dest, link })
  }

  /// Enforce the destination conflict rules: entries inside the `bin/`
  /// subtree are pipeline-owned and may be replaced; anything else that
  /// already exists is foreign.
  async fn clear_destination(&self, dest: &Path, resolved: &ResolvedName) -> Result<(), WriteError> {
    let meta = match fs::symlink_metadata(dest).await {
      Ok(meta) => meta,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(e.into()),
    };

    if !resolved.rel_path.starts_with(BIN_SUBTREE) {
      return Err(WriteError::Placement {
        path: dest.to_path_buf(),
        message: "destination already exists".to_string(),
      });
    }

    debug!(dest = ?dest, "replacing previous artifact in bin subtree");
    if meta.is_dir() {
      fs::remove_dir_all(dest).await?;
    } else {
      fs::remove_file(dest).await?;
    }
    Ok(())
  }

  /// Reject a bare name whose top-level slot is occupied by a foreign
  /// entry. Only an absent entry or a symlink into `bin/` (something this
  /// pipeline created) is acceptable.
  async fn check_bare_slot(&self, leaf: &str) -> Result<(), WriteError> {
    let link = self.root.join(leaf);
    match fs::symlink_metadata(&link).await {
      Ok(meta) => {
        if meta.file_type().is_symlink() && self.links_into_bin(&link).await {
          Ok(())
        } else {
          Err(WriteError::Placement {
            path: link,
            message: "existing entry is not an artifact symlink".to_string(),
          })
        }
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  /// Create (or refresh) the top-level symlink for a bare-name artifact.
  /// The slot has already passed `check_bare_slot`, so any entry still
  /// present is a previous artifact symlink.
  async fn link_bare_name(&self, leaf: &str) -> Result<PathBuf, WriteError> {
    let link = self.root.join(leaf);
    let target = PathBuf::from(BIN_SUBTREE).join(leaf);

    match fs::remove_file(&link).await {
      Ok(()) => {}
      Err(e) if e.kind() == ErrorKind::NotFound => {}
      Err(e) => return Err(e.into()),
    }

    symlink(&target, &link).await?;
    debug!(link = ?link, target = ?target, "bare-name symlink created");
    Ok(link)
  }

  async fn links_into_bin(&self, link: &Path) -> bool {
    match fs::read_link(link).await {
      Ok(target) => target.starts_with(BIN_SUBTREE) || target.starts_with(self.root.join(BIN_SUBTREE)),
      Err(_) => false,
    }
  }
}

/// Rename the scratch file to its destination. When scratch lives on a
/// different filesystem, stage a copy beside the destination first so the
/// final name still appears in one rename.
async fn move_into_place(src: &Path, dest: &Path) -> Result<(), WriteError> {
  match fs::rename(src, dest).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == ErrorKind::CrossesDevices => {
      let file_name = dest.file_name().and_then(|n| n.to_str()).unwrap_or("artifact");
      let staged = dest.with_file_name(format!(".{file_name}.incoming"));
      fs::copy(src, &staged).await?;
      fs::rename(&staged, dest).await?;
      fs::remove_file(src).await?;
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}
