//! End-to-end dataset build: download, aggregate, split.
//!
//! Blocking; call from `spawn_blocking` if used from async code.

use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;

use crate::annotations::{aggregate, load_annotation_table};
use crate::catalog::HashCatalog;
use crate::checksum;
use crate::config::Imgur5kConfig;
use crate::downloader::{default_workers, download_all};
use crate::fetch::InvalidUrl;
use crate::layout::DatasetLayout;
use crate::splits::{extract_split, load_split_ids};

/// Overrides for a single run (CLI flags take precedence over config).
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub workers: Option<usize>,
    pub skip_verified: bool,
}

/// Outcome of a run, for reporting.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Images on disk with the expected hash.
    pub matched: usize,
    /// Images attempted.
    pub total: usize,
    pub failures: Vec<InvalidUrl>,
    pub images_indexed: usize,
    pub annotations_indexed: usize,
    /// `(split name, images in split)` in config order.
    pub splits: Vec<(String, usize)>,
}

/// Runs the whole pipeline and writes images plus JSON indexes.
///
/// Fatal only for configuration and input-file problems; individual image
/// failures end up in [`RunSummary::failures`].
pub fn run(cfg: &Imgur5kConfig, layout: &DatasetLayout, opts: &RunOptions) -> Result<RunSummary> {
    let mut fetch_opts = cfg.fetch_options().context("invalid configuration")?;
    fetch_opts.skip_verified = opts.skip_verified;

    fs::create_dir_all(layout.output_dir())
        .with_context(|| format!("create output dir {}", layout.output_dir().display()))?;

    let catalog = Arc::new(HashCatalog::load(&layout.hash_list())?);
    let workers = opts.workers.or(cfg.workers).unwrap_or_else(default_workers);

    let report = download_all(Arc::clone(&catalog), layout.output_dir(), &fetch_opts, workers)?;
    let invalid_urls = report.invalid_urls();

    let rows = load_annotation_table(&layout.annotation_table())?;
    let index = aggregate(&rows, &invalid_urls, &catalog, layout.output_dir())?;
    index.write_json(&layout.annotations_json())?;
    tracing::info!(
        images = index.images(),
        annotations = index.annotations(),
        path = %layout.annotations_json().display(),
        "wrote annotation index"
    );

    let mut splits = Vec::with_capacity(cfg.splits.len());
    for name in &cfg.splits {
        let ids = load_split_ids(&layout.split_ids(name))?;
        let split = extract_split(&index, &ids);
        split.write_json(&layout.split_json(name))?;
        tracing::info!(split = %name, listed = ids.len(), images = split.images(), "wrote split index");
        splits.push((name.clone(), split.images()));
    }

    Ok(RunSummary {
        matched: report.matched(),
        total: report.total(),
        failures: report.failures().cloned().collect(),
        images_indexed: index.images(),
        annotations_indexed: index.annotations(),
        splits,
    })
}

/// Result of re-hashing images already on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub verified: Vec<String>,
    pub missing: Vec<String>,
    /// `(id, actual hash)` for files whose hash differs.
    pub mismatched: Vec<(String, String)>,
}

impl VerifyReport {
    pub fn total(&self) -> usize {
        self.verified.len() + self.missing.len() + self.mismatched.len()
    }
}

/// Re-hashes every cataloged image in the output dir. Read-only: nothing is
/// downloaded or deleted.
pub fn verify(layout: &DatasetLayout) -> Result<VerifyReport> {
    let catalog = HashCatalog::load(&layout.hash_list())?;
    let mut report = VerifyReport::default();
    for (id, expected) in catalog.iter() {
        let path = layout.image_path(id);
        if !path.exists() {
            report.missing.push(id.to_string());
            continue;
        }
        let actual = checksum::md5_path(&path)?;
        if actual.eq_ignore_ascii_case(expected) {
            report.verified.push(id.to_string());
        } else {
            tracing::warn!(id, expected, actual = %actual, "hash mismatch on disk");
            report.mismatched.push((id.to_string(), actual));
        }
    }
    tracing::info!(
        verified = report.verified.len(),
        missing = report.missing.len(),
        mismatched = report.mismatched.len(),
        "verify finished"
    );
    Ok(report)
}
