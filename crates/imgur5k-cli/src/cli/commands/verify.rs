//! `imgur5k verify` – re-hash downloaded images without touching the network.

use anyhow::{Context, Result};
use imgur5k_core::layout::DatasetLayout;
use imgur5k_core::pipeline;

pub async fn run_verify(layout: DatasetLayout) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || pipeline::verify(&layout))
        .await
        .context("verify task join")??;

    for (id, actual) in &report.mismatched {
        println!("MISMATCH {} (cur hash: {})", id, actual);
    }
    if !report.missing.is_empty() {
        println!("{} image(s) missing", report.missing.len());
    }
    println!("VERIFIED: {}/{}", report.verified.len(), report.total());
    Ok(())
}
