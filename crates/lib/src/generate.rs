//! Non-deterministic artifact generation.
//!
//! Bridges content produced by an external, non-reproducible generator
//! (e.g. a call to an inference service) into the content-addressed output
//! model. The generator runs out-of-band with a deadline and must emit the
//! full artifact content on stdout; the content is accepted only when its
//! hash matches a caller-held pin.
//!
//! Pinning is a deliberate two-step protocol: with no pin (the `"unknown"`
//! sentinel) or a stale pin, the build fails and reports the observed hash
//! so the caller can update the pin and rebuild. Nothing is ever accepted
//! silently, and the generator is never retried internally.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::consts::SHEBANG;
use crate::error::WriteError;
use crate::exec::run_shell_with_timeout;
use crate::spec::GeneratorConfig;
use crate::util::hash::{ContentHash, hash_bytes};

/// Sentinel string meaning "no pin yet".
pub const UNKNOWN_PIN: &str = "unknown";

/// Caller-held expected hash gating acceptance of generated content.
///
/// Lifecycle: `Unknown` at spec-authoring time, then pinned to the hash a
/// first (failing) build reports, then kept for reproducible rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PinnedHash {
  /// No pin yet; verification always rejects and reports the observed hash.
  #[default]
  Unknown,
  Pinned(ContentHash),
}

impl PinnedHash {
  pub fn parse(raw: &str) -> Self {
    if raw == UNKNOWN_PIN {
      Self::Unknown
    } else {
      Self::Pinned(ContentHash(raw.to_string()))
    }
  }
}

impl fmt::Display for PinnedHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unknown => write!(f, "{}", UNKNOWN_PIN),
      Self::Pinned(hash) => write!(f, "{}", hash),
    }
  }
}

impl Serialize for PinnedHash {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for PinnedHash {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self::parse(&raw))
  }
}

/// Run the external generator and verify its output against the pin.
///
/// State transitions (pending → generating → verifying → sealed) are logged
/// as `state` fields; rejection and failure are the error paths. Returns
/// the sealed content: the generated bytes, with a shebang preamble
/// synthesized from `fallback_interpreter` when the content carries none,
/// so the sealed artifact is always directly executable.
pub async fn generate_content(
  config: &GeneratorConfig,
  fallback_interpreter: &Path,
  scratch: &Path,
) -> Result<Vec<u8>, WriteError> {
  debug!(state = "pending", cmd = %config.command, pin = %config.pin, "generator pipeline starting");

  debug!(state = "generating", timeout_secs = config.timeout_secs, "invoking external generator");
  let limit = Duration::from_secs(config.timeout_secs);
  let output = match run_shell_with_timeout(&config.command, scratch, limit).await? {
    Some(output) => output,
    None => {
      warn!(state = "failed", cmd = %config.command, "generator deadline expired, child killed");
      return Err(generation_failed(config, format!("timed out after {}s", config.timeout_secs)));
    }
  };
  if !output.success() {
    warn!(state = "failed", code = ?output.code, "generator exited non-zero");
    return Err(generation_failed(
      config,
      format!("exit {:?}\n{}", output.code, output.stderr_lossy()),
    ));
  }
  if output.stdout.is_empty() {
    warn!(state = "failed", "generator produced no output");
    return Err(generation_failed(config, "generator produced no output".to_string()));
  }

  let observed = hash_bytes(&output.stdout);
  debug!(state = "verifying", observed = %observed, "comparing generated content against pin");
  match &config.pin {
    PinnedHash::Pinned(expected) if *expected == observed => {}
    PinnedHash::Pinned(expected) => {
      warn!(state = "rejected", expected = %expected, observed = %observed, "pinned hash mismatch");
      return Err(WriteError::HashMismatch {
        expected: expected.0.clone(),
        observed: observed.0,
      });
    }
    PinnedHash::Unknown => {
      // First run of the discover-then-pin protocol; always rejects.
      info!(state = "rejected", observed = %observed, "no pin yet; pin the observed hash and rebuild");
      return Err(WriteError::HashMismatch {
        expected: UNKNOWN_PIN.to_string(),
        observed: observed.0,
      });
    }
  }

  let mut content = output.stdout;
  if !content.starts_with(SHEBANG.as_bytes()) {
    debug!(interpreter = ?fallback_interpreter, "no executable preamble, synthesizing one");
    let mut sealed = format!("{}{}\n", SHEBANG, fallback_interpreter.display()).into_bytes();
    sealed.extend_from_slice(&content);
    content = sealed;
  }

  info!(state = "sealed", bytes = content.len(), "generated content sealed");
  Ok(content)
}

fn generation_failed(config: &GeneratorConfig, message: String) -> WriteError {
  WriteError::GenerationFailed {
    cmd: config.command.clone(),
    message,
  }
}
