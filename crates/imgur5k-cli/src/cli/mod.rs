//! CLI for the IMGUR5K dataset fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgur5k_core::checksum::Algorithm;
use imgur5k_core::config;
use imgur5k_core::layout::{DatasetLayout, DEFAULT_DATASET_INFO_DIR, DEFAULT_OUTPUT_DIR};
use imgur5k_core::pipeline::RunOptions;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_download, run_verify};

/// Top-level CLI for the IMGUR5K dataset fetcher.
#[derive(Debug, Parser)]
#[command(name = "imgur5k")]
#[command(about = "Download and index the IMGUR5K dataset", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download all images, verify their hashes and write the annotation indexes.
    Download {
        /// Directory with the hash list, annotation table and split lists.
        #[arg(long, default_value = DEFAULT_DATASET_INFO_DIR, value_name = "DIR")]
        dataset_info_dir: PathBuf,
        /// Directory the images are saved to.
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
        output_dir: PathBuf,
        /// Number of download workers (default: CPUs - 1).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Keep images already on disk whose hash matches instead of downloading them again.
        #[arg(long)]
        skip_verified: bool,
    },

    /// Re-hash downloaded images against the hash list without downloading.
    Verify {
        /// Directory with the hash list.
        #[arg(long, default_value = DEFAULT_DATASET_INFO_DIR, value_name = "DIR")]
        dataset_info_dir: PathBuf,
        /// Directory holding the downloaded images.
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
        output_dir: PathBuf,
    },

    /// Compute the checksum of a file.
    Checksum {
        /// Path to the file.
        path: String,
        /// Digest algorithm: md5 or sha256.
        #[arg(long, default_value = "md5")]
        algo: Algorithm,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                dataset_info_dir,
                output_dir,
                workers,
                skip_verified,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let layout = DatasetLayout::new(dataset_info_dir, output_dir);
                let opts = RunOptions {
                    workers,
                    skip_verified,
                };
                run_download(cfg, layout, opts).await?;
            }
            CliCommand::Verify {
                dataset_info_dir,
                output_dir,
            } => run_verify(DatasetLayout::new(dataset_info_dir, output_dir)).await?,
            CliCommand::Checksum { path, algo } => run_checksum(Path::new(&path), algo).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
