//! Build steps that turn materialized content into a raw executable.

pub mod check;
pub mod compile;
pub mod shebang;

use std::path::PathBuf;

/// A raw executable at a scratch path. Owned by the build step until the
/// relocator takes it; never exposed to callers of the pipeline.
#[derive(Debug)]
pub struct BuildResult {
  pub scratch_path: PathBuf,
}
