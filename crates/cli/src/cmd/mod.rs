mod build;
mod hash;

pub use build::cmd_build;
pub use hash::cmd_hash;
