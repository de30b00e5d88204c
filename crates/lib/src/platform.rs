//! Execution-environment facts.
//!
//! Platform-conditional behavior is resolved once into [`Capabilities`] and
//! injected into the pipeline, instead of being re-detected at every call
//! site.

use std::fmt;

/// Operating system families the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Platform quirks the build steps must account for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
  /// The kernel refuses a script as the interpreter of another script, so
  /// shebang lines must splice in the script's own interpreter.
  pub requires_interpreter_chaining: bool,

  /// Freshly linked binaries need a repair pass before they are valid
  /// executables.
  pub requires_post_link_fixup: bool,
}

impl Capabilities {
  /// Capabilities required on the given OS family.
  pub fn for_os(os: Os) -> Self {
    match os {
      Os::MacOs => Self {
        requires_interpreter_chaining: true,
        requires_post_link_fixup: true,
      },
      Os::Linux | Os::Windows => Self::default(),
    }
  }

  /// Capabilities of the running system. Unknown platforms get the
  /// conservative default (no chaining, no fixup).
  pub fn current() -> Self {
    Os::current().map(Self::for_os).unwrap_or_default()
  }
}

/// Everything the pipeline needs to know about where it runs, supplied by
/// the caller rather than read from ambient global state.
#[derive(Debug, Clone, Default)]
pub struct WriterEnv {
  pub capabilities: Capabilities,

  /// Repair command run (with `out` exported) on freshly linked binaries
  /// when the platform requires a post-link fixup.
  pub post_link_fixup: Option<String>,
}

impl WriterEnv {
  /// Environment for the running system, with no fixup command configured.
  pub fn current() -> Self {
    Self {
      capabilities: Capabilities::current(),
      post_link_fixup: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_returns_supported_os() {
    assert!(Os::current().is_some(), "current OS should be supported");
  }

  #[test]
  fn macos_uses_darwin_identifier() {
    assert_eq!(Os::MacOs.as_str(), "darwin");
  }

  #[test]
  fn darwin_needs_chaining_and_fixup() {
    let caps = Capabilities::for_os(Os::MacOs);
    assert!(caps.requires_interpreter_chaining);
    assert!(caps.requires_post_link_fixup);
  }

  #[test]
  fn linux_needs_neither() {
    assert_eq!(Capabilities::for_os(Os::Linux), Capabilities::default());
  }
}
