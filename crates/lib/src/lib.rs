//! wright-lib: core pipeline for writing executable artifacts.
//!
//! Given a logical name (or explicit path), a body of source content, and a
//! build specification, this crate produces a single executable artifact
//! inside an immutable output tree:
//!
//! - `name`: turns a caller-supplied name-or-path into a final location
//! - `content`: materializes inline text or a file reference for build steps
//! - `build`: shebang-wraps interpreted content or runs a compile command,
//!   gated by an optional validation command
//! - `tree`: relocates the raw executable into the output tree
//! - `wrap`: optional runtime environment injection around the placed binary
//! - `generate`: hash-pinned builds for externally generated content

pub mod build;
pub mod consts;
pub mod content;
pub mod error;
pub mod exec;
pub mod generate;
pub mod name;
pub mod pipeline;
pub mod platform;
pub mod spec;
pub mod tree;
pub mod util;
pub mod wrap;

pub use error::WriteError;
pub use pipeline::write_artifact;
pub use spec::ArtifactSpec;
pub use tree::{FinalArtifact, OutputTree};
