//! Error taxonomy for artifact builds.
//!
//! Every subprocess failure carries the captured diagnostics verbatim, and
//! nothing is retried internally: each failure mode either reproduces
//! deterministically or needs a config change (fix a name, re-pin a hash).

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller of the artifact pipeline.
#[derive(Debug, Error)]
pub enum WriteError {
  /// A bare artifact name contained characters outside the allowed grammar.
  #[error("invalid artifact name: {name:?}")]
  InvalidName { name: String },

  /// The spec combined fields in an unsupported way.
  #[error("invalid artifact spec: {0}")]
  InvalidSpec(String),

  /// The check command rejected the artifact before finalization.
  #[error("check command `{cmd}` rejected artifact (exit {code:?})\n{stdout}{stderr}")]
  CheckFailed {
    cmd: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// The compile command (or strip/fixup pass) failed.
  #[error("compile command `{cmd}` failed (exit {code:?})\n{stdout}{stderr}")]
  CompileFailed {
    cmd: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// The interpreter is a script whose own interpreter is also a script.
  /// Chains deeper than one level cannot be expressed on a shebang line.
  #[error("interpreter {interpreter} chains to {chained:?}, which is itself a script")]
  UnsupportedInterpreterChain { interpreter: PathBuf, chained: String },

  /// The destination inside the output tree conflicts with an existing
  /// entry that this pipeline did not produce.
  #[error("cannot place artifact at {path}: {message}")]
  Placement { path: PathBuf, message: String },

  /// The external generator crashed, timed out, or produced no output.
  #[error("generator `{cmd}` failed: {message}")]
  GenerationFailed { cmd: String, message: String },

  /// Generated content did not match the pinned hash. The observed hash is
  /// carried so the caller can update the pin and rebuild.
  #[error("generated content hash {observed} does not match pin {expected}")]
  HashMismatch { expected: String, observed: String },

  /// I/O error during the build.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
