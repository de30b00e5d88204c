//! Artifact build specifications.
//!
//! One [`ArtifactSpec`] yields exactly one executable in the output tree.
//! Every configuration surface is a struct with named optional fields and
//! documented defaults; toolchain references are part of the spec instead of
//! being resolved from ambient state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::generate::PinnedHash;
use crate::name::ArtifactName;

/// Default deadline for external generator processes, in seconds.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 120;

/// The payload an artifact is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSource {
  /// Literal text, persisted verbatim to a private scratch file before any
  /// build command runs.
  Inline(String),
  /// Reference to an existing file, passed through unchanged.
  File(PathBuf),
  /// Content produced by an external, non-reproducible generator and gated
  /// by a pinned hash.
  Generated(GeneratorConfig),
}

/// How the raw executable is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
  Shebang(ShebangConfig),
  Compile(CompileConfig),
}

/// Configuration for interpreted artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShebangConfig {
  /// Interpreter named on the shebang line. May itself be a script on
  /// platforms that require interpreter chaining.
  pub interpreter: PathBuf,

  /// Optional validation command (program plus fixed arguments); the
  /// scratch artifact path is appended as the sole positional argument.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub check: Option<Vec<String>>,
}

/// Configuration for compiled artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
  /// Shell template run in the scratch directory with `src` (materialized
  /// content) and `out` (expected output path) exported.
  pub command: String,

  /// Strip debug symbols from the output after a successful compile.
  #[serde(default)]
  pub strip: bool,

  /// Tool invoked as `<strip_command> "$out"` when stripping.
  #[serde(default = "default_strip_command")]
  pub strip_command: String,
}

fn default_strip_command() -> String {
  "strip".to_string()
}

/// Configuration for the non-deterministic generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
  /// Shell template whose stdout becomes the artifact content.
  pub command: String,

  /// Deadline for the generator process; on expiry the child is killed.
  #[serde(default = "default_generator_timeout_secs")]
  pub timeout_secs: u64,

  /// Expected content hash. Defaults to the `"unknown"` sentinel, which
  /// always rejects and reports the observed hash for pinning.
  #[serde(default)]
  pub pin: PinnedHash,
}

fn default_generator_timeout_secs() -> u64 {
  DEFAULT_GENERATOR_TIMEOUT_SECS
}

/// One environment mutation applied by the wrapper before the real program
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapArg {
  /// Set an environment variable unconditionally.
  Set { name: String, value: String },
  /// Prepend a value to a separator-joined list variable such as `PATH`.
  Prefix { name: String, sep: String, value: String },
}

/// Everything needed to build one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSpec {
  pub name: ArtifactName,
  pub source: ArtifactSource,
  pub build: BuildKind,

  /// Ordered environment mutations wrapped around the placed executable.
  /// An empty list skips the wrapper entirely.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub wrap: Vec<WrapArg>,
}
