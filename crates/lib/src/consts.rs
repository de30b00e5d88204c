//! Shared constants.

/// Subtree under the output root holding the real executables behind
/// bare-name artifacts. Writable by the pipeline, so the wrapper can place
/// both a binary and its shim next to each other.
pub const BIN_SUBTREE: &str = "bin";

/// Preamble marker for directly executable text.
pub const SHEBANG: &str = "#!";

/// Name of the materialized content file inside a build scratch directory.
pub const SCRATCH_SRC: &str = "src";

/// Name of the build output file inside a build scratch directory.
pub const SCRATCH_OUT: &str = "out";
