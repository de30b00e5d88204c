//! Artifact name resolution.
//!
//! A caller-supplied string is either an absolute-style path ("place the
//! artifact exactly here under the output root") or a bare token ("give the
//! artifact this name, discoverable at the output root"). The distinction is
//! decided once at parse time and never re-inspected.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::BIN_SUBTREE;
use crate::error::WriteError;

/// Where an artifact should live inside the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArtifactName {
  /// Bare token; the real executable lands under `bin/` with a
  /// discoverability symlink at the output root.
  Bare(String),
  /// Absolute-style path, stored as its segments under the output root.
  Explicit(Vec<String>),
}

/// Output of name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
  /// Final path of the real executable, relative to the output root.
  pub rel_path: PathBuf,
  /// Final path segment.
  pub leaf: String,
  /// True when the caller supplied an explicit path rather than a bare name.
  pub explicit: bool,
}

/// Check a path leaf against the filename grammar
/// `[A-Za-z0-9._][A-Za-z0-9._-]*`.
pub fn is_valid_leaf(leaf: &str) -> bool {
  let mut chars = leaf.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphanumeric() || c == '.' || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

impl ArtifactName {
  /// Parse a name-or-path. Leading `/` selects the explicit form; anything
  /// else must be a bare token matching the filename grammar.
  pub fn parse(raw: &str) -> Result<Self, WriteError> {
    let invalid = || WriteError::InvalidName { name: raw.to_string() };

    if let Some(rest) = raw.strip_prefix('/') {
      let segments: Vec<String> = rest.split('/').map(str::to_string).collect();
      // The path is used verbatim: empty segments are rejected rather than
      // normalized away, and dot segments would let a path climb out of the
      // output tree.
      if segments.iter().any(|s| s.is_empty() || s == "." || s == "..") {
        return Err(invalid());
      }
      let Some(leaf) = segments.last() else {
        return Err(invalid());
      };
      if !is_valid_leaf(leaf) {
        return Err(invalid());
      }
      Ok(Self::Explicit(segments))
    } else if is_valid_leaf(raw) {
      Ok(Self::Bare(raw.to_string()))
    } else {
      Err(invalid())
    }
  }

  /// Final path segment of the artifact.
  pub fn leaf(&self) -> &str {
    match self {
      Self::Bare(name) => name,
      Self::Explicit(segments) => segments.last().map(String::as_str).unwrap_or_default(),
    }
  }

  /// Resolve to a location inside the output tree. Pure.
  pub fn resolve(&self) -> ResolvedName {
    match self {
      Self::Bare(name) => ResolvedName {
        rel_path: PathBuf::from(BIN_SUBTREE).join(name),
        leaf: name.clone(),
        explicit: false,
      },
      Self::Explicit(segments) => ResolvedName {
        rel_path: segments.iter().collect(),
        leaf: self.leaf().to_string(),
        explicit: true,
      },
    }
  }
}

impl TryFrom<String> for ArtifactName {
  type Error = WriteError;

  fn try_from(raw: String) -> Result<Self, Self::Error> {
    Self::parse(&raw)
  }
}

impl From<ArtifactName> for String {
  fn from(name: ArtifactName) -> Self {
    match name {
      ArtifactName::Bare(name) => name,
      ArtifactName::Explicit(segments) => format!("/{}", segments.join("/")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_name_resolves_under_bin() {
    let name = ArtifactName::parse("hello").unwrap();
    let resolved = name.resolve();

    assert!(!resolved.explicit);
    assert_eq!(resolved.leaf, "hello");
    assert_eq!(resolved.rel_path, PathBuf::from("bin/hello"));
  }

  #[test]
  fn explicit_path_is_used_verbatim() {
    let name = ArtifactName::parse("/bin/tool").unwrap();
    let resolved = name.resolve();

    assert!(resolved.explicit);
    assert_eq!(resolved.leaf, "tool");
    assert_eq!(resolved.rel_path, PathBuf::from("bin/tool"));
  }

  #[test]
  fn nested_explicit_path_keeps_all_segments() {
    let resolved = ArtifactName::parse("/libexec/app/run.sh").unwrap().resolve();
    assert_eq!(resolved.rel_path, PathBuf::from("libexec/app/run.sh"));
    assert_eq!(resolved.leaf, "run.sh");
  }

  #[test]
  fn bare_and_explicit_share_a_leaf_location() {
    let bare = ArtifactName::parse("prog").unwrap().resolve();
    let explicit = ArtifactName::parse("/bin/prog").unwrap().resolve();
    assert_eq!(bare.rel_path, explicit.rel_path);
  }

  #[test]
  fn grammar_accepts_dots_underscores_dashes() {
    for name in ["a", "foo.sh", "_helper", ".hidden", "x86-64_tool.v2"] {
      assert!(ArtifactName::parse(name).is_ok(), "{name:?} should parse");
    }
  }

  #[test]
  fn grammar_rejects_bad_tokens() {
    for name in ["", "-flag", "has space", "semi;colon", "a/b", "tab\tname"] {
      assert!(
        matches!(ArtifactName::parse(name), Err(WriteError::InvalidName { .. })),
        "{name:?} should be rejected"
      );
    }
  }

  #[test]
  fn explicit_path_rejects_traversal_and_empty_leaf() {
    for path in ["/", "/bin/", "//bin//x", "/bin//tool", "/../etc/passwd", "/bin/../../x", "/bin/."] {
      assert!(
        matches!(ArtifactName::parse(path), Err(WriteError::InvalidName { .. })),
        "{path:?} should be rejected"
      );
    }
  }

  #[test]
  fn serde_round_trips_both_forms() {
    for raw in ["hello", "/bin/tool"] {
      let name = ArtifactName::parse(raw).unwrap();
      let json = serde_json::to_string(&name).unwrap();
      assert_eq!(json, format!("{raw:?}"));
      let back: ArtifactName = serde_json::from_str(&json).unwrap();
      assert_eq!(back, name);
    }
  }

  #[test]
  fn serde_rejects_invalid_name() {
    let result: Result<ArtifactName, _> = serde_json::from_str("\"bad name\"");
    assert!(result.is_err());
  }
}
