use std::path::Path;

use anyhow::{Context, Result};

use wright_lib::util::hash::hash_file;

pub fn cmd_hash(file: &Path) -> Result<()> {
  let hash = hash_file(file).with_context(|| format!("failed to hash {}", file.display()))?;
  println!("{hash}");
  Ok(())
}
