//! `imgur5k download` – fetch images and write the annotation indexes.

use anyhow::{Context, Result};
use imgur5k_core::config::Imgur5kConfig;
use imgur5k_core::layout::DatasetLayout;
use imgur5k_core::pipeline::{self, RunOptions};

pub async fn run_download(cfg: Imgur5kConfig, layout: DatasetLayout, opts: RunOptions) -> Result<()> {
    tracing::info!(
        dataset_info_dir = %layout.dataset_info_dir().display(),
        output_dir = %layout.output_dir().display(),
        "download started"
    );
    let summary = tokio::task::spawn_blocking(move || pipeline::run(&cfg, &layout, &opts))
        .await
        .context("download task join")??;

    for failure in &summary.failures {
        println!("{}", failure);
    }
    for (split, images) in &summary.splits {
        println!("{}: {} images", split, images);
    }
    println!(
        "Indexed {} images, {} annotations",
        summary.images_indexed, summary.annotations_indexed
    );
    println!("MATCHES: {}/{}", summary.matched, summary.total);
    Ok(())
}
