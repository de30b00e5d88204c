//! CLI smoke tests for wright.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use wright_lib::util::hash::hash_bytes;

fn wright_cmd() -> Command {
  Command::cargo_bin("wright").unwrap()
}

/// Write a JSON artifact spec into a temp directory.
fn temp_spec(json: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("spec.json"), json).unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  wright_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  wright_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("wright"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "hash"] {
    wright_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Build
// =============================================================================

const HELLO_SPEC: &str = r#"{
  "name": "hello",
  "source": { "inline": "echo hi" },
  "build": { "shebang": { "interpreter": "/bin/sh" } }
}"#;

#[test]
fn build_writes_a_shebang_artifact() {
  let temp = temp_spec(HELLO_SPEC);
  let root = temp.path().join("tree");

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(&root)
    .assert()
    .success()
    .stdout(predicate::str::contains("Artifact written"));

  let bytes = std::fs::read(root.join("bin/hello")).unwrap();
  assert_eq!(bytes, b"#!/bin/sh\necho hi");
  assert!(root.join("hello").exists());
}

#[test]
fn build_rejects_invalid_name() {
  let temp = temp_spec(
    r#"{
      "name": "bad name",
      "source": { "inline": "echo hi" },
      "build": { "shebang": { "interpreter": "/bin/sh" } }
    }"#,
  );

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(temp.path().join("tree"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid artifact name"));
}

#[test]
fn build_fails_on_missing_spec() {
  let temp = TempDir::new().unwrap();

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("absent.json"))
    .arg("--root")
    .arg(temp.path().join("tree"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to read spec"));
}

#[test]
fn build_surfaces_check_rejection() {
  let temp = temp_spec(
    r#"{
      "name": "checked",
      "source": { "inline": "echo hi" },
      "build": { "shebang": { "interpreter": "/bin/sh", "check": ["false"] } }
    }"#,
  );
  let root = temp.path().join("tree");

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(&root)
    .assert()
    .failure()
    .stderr(predicate::str::contains("check command"));

  assert!(!root.join("bin/checked").exists());
}

// =============================================================================
// Generated content: discover the hash, pin it, rebuild
// =============================================================================

#[test]
fn generated_build_reports_hash_then_succeeds_once_pinned() {
  let observed = hash_bytes(b"generated body\n");

  let unpinned = r#"{
    "name": "gen",
    "source": { "generated": { "command": "echo generated body" } },
    "build": { "shebang": { "interpreter": "/bin/sh" } }
  }"#;
  let temp = temp_spec(unpinned);
  let root = temp.path().join("tree");

  // First run: no pin, always rejected, observed hash surfaced.
  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(&root)
    .assert()
    .failure()
    .stderr(predicate::str::contains(&observed.0));

  // Second run with the pin in place: sealed and written.
  let pinned = format!(
    r#"{{
      "name": "gen",
      "source": {{ "generated": {{ "command": "echo generated body", "pin": "{}" }} }},
      "build": {{ "shebang": {{ "interpreter": "/bin/sh" }} }}
    }}"#,
    observed.0
  );
  std::fs::write(temp.path().join("spec.json"), pinned).unwrap();

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(&root)
    .assert()
    .success();

  let bytes = std::fs::read(root.join("bin/gen")).unwrap();
  assert_eq!(bytes, b"#!/bin/sh\ngenerated body\n");
}

#[test]
fn generator_timeout_flag_overrides_spec() {
  let temp = temp_spec(
    r#"{
      "name": "slow",
      "source": { "generated": { "command": "sleep 30; echo late", "timeout_secs": 120 } },
      "build": { "shebang": { "interpreter": "/bin/sh" } }
    }"#,
  );

  wright_cmd()
    .arg("build")
    .arg(temp.path().join("spec.json"))
    .arg("--root")
    .arg(temp.path().join("tree"))
    .arg("--generator-timeout")
    .arg("1s")
    .timeout(std::time::Duration::from_secs(20))
    .assert()
    .failure()
    .stderr(predicate::str::contains("timed out"));
}

// =============================================================================
// Hash
// =============================================================================

#[test]
fn hash_prints_the_content_hash() {
  let temp = TempDir::new().unwrap();
  let file = temp.path().join("content");
  std::fs::write(&file, "generated body\n").unwrap();

  wright_cmd()
    .arg("hash")
    .arg(&file)
    .assert()
    .success()
    .stdout(predicate::str::contains(&hash_bytes(b"generated body\n").0));
}

#[test]
fn hash_fails_on_missing_file() {
  let temp = TempDir::new().unwrap();

  wright_cmd()
    .arg("hash")
    .arg(temp.path().join("absent"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to hash"));
}
