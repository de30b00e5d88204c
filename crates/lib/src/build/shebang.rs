//! Shebang-wrapped interpreted artifacts.
//!
//! The interesting part is interpreter chaining: some interpreters
//! (virtual-environment wrappers, mostly) are themselves shell scripts, and
//! some kernels refuse a script as the interpreter of another script. On
//! those platforms the script's own interpreter is spliced onto the line,
//! with the original interpreter path appended as its argument.

use std::path::Path;

use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::build::BuildResult;
use crate::build::check::run_check;
use crate::consts::{SCRATCH_OUT, SHEBANG};
use crate::error::WriteError;
use crate::platform::Capabilities;
use crate::spec::ShebangConfig;
use crate::util::fs::make_executable;

/// Build an interpreted artifact: shebang line plus content, checked and
/// marked executable, all inside the scratch directory.
pub async fn build_shebang(
  config: &ShebangConfig,
  content_path: &Path,
  scratch: &Path,
  capabilities: Capabilities,
) -> Result<BuildResult, WriteError> {
  let line = interpreter_line(&config.interpreter, capabilities).await?;
  let content = fs::read(content_path).await?;

  let out_path = scratch.join(SCRATCH_OUT);
  let mut bytes = Vec::with_capacity(line.len() + 1 + content.len());
  bytes.extend_from_slice(line.as_bytes());
  bytes.push(b'\n');
  bytes.extend_from_slice(&content);
  fs::write(&out_path, &bytes).await?;

  if let Some(check) = &config.check {
    run_check(check, &out_path, scratch).await?;
  }

  make_executable(&out_path).await?;
  info!(interpreter = ?config.interpreter, out = ?out_path, "interpreted artifact built");
  Ok(BuildResult { scratch_path: out_path })
}

/// Synthesize the shebang line for an interpreter.
///
/// Without the chaining capability this is always `#!<interpreter>`. With
/// it, a script interpreter's own shebang payload is spliced in front and
/// the original path appended; the payload may carry flags and is forwarded
/// as one opaque string rather than re-parsed.
pub async fn interpreter_line(interpreter: &Path, capabilities: Capabilities) -> Result<String, WriteError> {
  if capabilities.requires_interpreter_chaining
    && let Some(own_line) = script_shebang(interpreter).await?
  {
    let discovered = own_line
      .split_whitespace()
      .find(|token| !token.starts_with('-'))
      .unwrap_or_default()
      .to_string();

    // One level of chaining is all a shebang line can express.
    if script_shebang(Path::new(&discovered)).await?.is_some() {
      return Err(WriteError::UnsupportedInterpreterChain {
        interpreter: interpreter.to_path_buf(),
        chained: discovered,
      });
    }

    debug!(interpreter = ?interpreter, via = %own_line, "chaining script interpreter");
    return Ok(format!("{}{} {}", SHEBANG, own_line, interpreter.display()));
  }

  Ok(format!("{}{}", SHEBANG, interpreter.display()))
}

/// Read the shebang payload of a file, if it has one. Only the head of the
/// file is read; the payload is the first line with `#!` stripped.
async fn script_shebang(path: &Path) -> Result<Option<String>, WriteError> {
  let mut file = match fs::File::open(path).await {
    Ok(file) => file,
    // An unreadable interpreter will fail later at execution time;
    // treat it as a non-script here.
    Err(_) => return Ok(None),
  };

  let mut head = [0u8; 512];
  let mut filled = 0;
  while filled < head.len() {
    let n = file.read(&mut head[filled..]).await?;
    if n == 0 {
      break;
    }
    filled += n;
    if head[..filled].contains(&b'\n') {
      break;
    }
  }

  let head = &head[..filled];
  if !head.starts_with(SHEBANG.as_bytes()) {
    return Ok(None);
  }

  let line_end = head.iter().position(|&b| b == b'\n').unwrap_or(head.len());
  let payload = String::from_utf8_lossy(&head[SHEBANG.len()..line_end]).trim().to_string();
  Ok(Some(payload))
}
