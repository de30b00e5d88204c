//! Runtime environment wrapping.
//!
//! Rewrites a placed executable so that configured environment mutations
//! apply before the real program runs, without modifying the program's own
//! bytes: the real binary moves to a dot-prefixed sibling and a small shell
//! shim takes its place.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::error::WriteError;
use crate::spec::WrapArg;
use crate::tree::FinalArtifact;
use crate::util::fs::make_executable;

/// Wrap a placed artifact with the given environment mutations, in order.
///
/// Skips entirely when `args` is empty; the shim's exec costs startup
/// latency that must not be paid when nothing is injected. The bare-name
/// symlink (if any) is untouched and transparently reaches the shim.
pub async fn wrap_artifact(artifact: &FinalArtifact, args: &[WrapArg]) -> Result<(), WriteError> {
  if args.is_empty() {
    debug!("no wrap args, skipping wrapper");
    return Ok(());
  }

  let path = &artifact.path;
  let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| WriteError::Placement {
    path: path.clone(),
    message: "artifact path has no file name".to_string(),
  })?;
  let real = path.with_file_name(format!(".{file_name}-wrapped"));

  fs::rename(path, &real).await?;
  fs::write(path, render_shim(&real, args)).await?;
  make_executable(path).await?;

  info!(shim = ?path, real = ?real, mutations = args.len(), "artifact wrapped");
  Ok(())
}

fn render_shim(real: &Path, args: &[WrapArg]) -> String {
  let mut script = String::from("#!/bin/sh\n");
  for arg in args {
    match arg {
      WrapArg::Set { name, value } => {
        script.push_str(&format!("export {name}=\"{value}\"\n"));
      }
      WrapArg::Prefix { name, sep, value } => {
        // Only join with the separator when the variable was already set.
        script.push_str(&format!("export {name}=\"{value}${{{name}:+{sep}${{{name}}}}}\"\n"));
      }
    }
  }
  script.push_str(&format!("exec \"{}\" \"$@\"\n", real.display()));
  script
}
