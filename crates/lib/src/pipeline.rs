//! End-to-end artifact pipeline.
//!
//! Control flow: resolve name → materialize (or generate) content → build →
//! relocate → wrap. Each build owns a private scratch directory whose
//! cleanup is guaranteed on every exit path, and shares no mutable state
//! with any other build; concurrency across independent specs belongs to
//! the caller.

use std::path::Path;

use tempfile::TempDir;
use tracing::info;

use crate::build::BuildResult;
use crate::build::check::run_check;
use crate::build::compile::build_compile;
use crate::build::shebang::build_shebang;
use crate::consts::SCRATCH_OUT;
use crate::content::materialize;
use crate::error::WriteError;
use crate::generate::generate_content;
use crate::platform::WriterEnv;
use crate::spec::{ArtifactSource, ArtifactSpec, BuildKind, ShebangConfig};
use crate::tree::{FinalArtifact, OutputTree};
use crate::util::fs::make_executable;
use crate::wrap::wrap_artifact;

/// Build one artifact spec into the output tree.
///
/// Returns the final artifact location, or the first error from any stage;
/// a failed build never touches the output tree.
pub async fn write_artifact(
  spec: &ArtifactSpec,
  tree: &OutputTree,
  env: &WriterEnv,
) -> Result<FinalArtifact, WriteError> {
  let resolved = spec.name.resolve();
  info!(leaf = %resolved.leaf, explicit = resolved.explicit, "writing artifact");

  let scratch = TempDir::new()?;

  let result = match &spec.source {
    ArtifactSource::Generated(config) => {
      let BuildKind::Shebang(shebang) = &spec.build else {
        return Err(WriteError::InvalidSpec(
          "generated content requires a shebang build".to_string(),
        ));
      };
      let sealed = generate_content(config, &shebang.interpreter, scratch.path()).await?;
      finalize_sealed(sealed, shebang, scratch.path()).await?
    }
    source => {
      let content_path = materialize(source, scratch.path()).await?;
      match &spec.build {
        BuildKind::Shebang(config) => {
          build_shebang(config, &content_path, scratch.path(), env.capabilities).await?
        }
        BuildKind::Compile(config) => build_compile(config, &content_path, scratch.path(), env).await?,
      }
    }
  };

  let artifact = tree.relocate(result, &resolved).await?;
  wrap_artifact(&artifact, &spec.wrap).await?;
  Ok(artifact)
}

/// Finalize sealed generator content. The seal guarantees an executable
/// preamble, so no shebang line is added; the check gate still applies.
async fn finalize_sealed(sealed: Vec<u8>, config: &ShebangConfig, scratch: &Path) -> Result<BuildResult, WriteError> {
  let out_path = scratch.join(SCRATCH_OUT);
  tokio::fs::write(&out_path, &sealed).await?;

  if let Some(check) = &config.check {
    run_check(check, &out_path, scratch).await?;
  }

  make_executable(&out_path).await?;
  Ok(BuildResult { scratch_path: out_path })
}
