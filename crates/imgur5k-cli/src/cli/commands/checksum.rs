//! `imgur5k checksum <path>` – compute the digest of a file.

use anyhow::Result;
use imgur5k_core::checksum::{self, Algorithm};
use std::path::Path;

/// Compute and print the digest of the given file.
pub async fn run_checksum(path: &Path, algo: Algorithm) -> Result<()> {
    let digest = checksum::digest_file(path, algo)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
