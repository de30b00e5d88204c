use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use wright_lib::platform::WriterEnv;
use wright_lib::spec::{ArtifactSource, ArtifactSpec};
use wright_lib::{OutputTree, WriteError, write_artifact};

use crate::output::{format_duration, print_error, print_info, print_stat, print_success};

pub async fn cmd_build(spec_path: &Path, root: &Path, generator_timeout: Option<Duration>) -> Result<()> {
  let start = Instant::now();

  let raw = std::fs::read_to_string(spec_path)
    .with_context(|| format!("failed to read spec {}", spec_path.display()))?;
  let mut spec: ArtifactSpec =
    serde_json::from_str(&raw).with_context(|| format!("invalid artifact spec {}", spec_path.display()))?;

  if let Some(limit) = generator_timeout
    && let ArtifactSource::Generated(config) = &mut spec.source
  {
    config.timeout_secs = limit.as_secs();
  }

  let tree = OutputTree::new(root);
  let env = WriterEnv::current();

  match write_artifact(&spec, &tree, &env).await {
    Ok(artifact) => {
      print_success("Artifact written");
      print_stat("Path", &artifact.path.display().to_string());
      if let Some(link) = &artifact.link {
        print_stat("Link", &link.display().to_string());
      }
      print_stat("Duration", &format_duration(start.elapsed()));
      Ok(())
    }
    Err(WriteError::HashMismatch { expected, observed }) => {
      print_error(&format!("generated content hash {observed} does not match pin {expected}"));
      print_info(&format!(
        "to accept this content, set \"pin\": \"{observed}\" in the spec and rebuild"
      ));
      std::process::exit(1);
    }
    Err(e) => {
      print_error(&format!("build failed: {e}"));
      std::process::exit(1);
    }
  }
}
