//! Concurrent image downloader.
//!
//! Runs [`fetch`] for every identifier in the hash catalog on a bounded pool
//! of OS threads. Workers pull positions from a shared queue and send
//! `(position, outcome)` back over a channel; outcomes are stored in an
//! indexed buffer so the report is aligned with catalog order no matter
//! which worker finishes first. A failed fetch never stops the others.

use anyhow::{anyhow, Result};
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::catalog::HashCatalog;
use crate::fetch::{fetch, FetchOptions, FetchOutcome, InvalidUrl};

/// Progress is logged every this many completed fetches.
const PROGRESS_EVERY: usize = 100;

/// Worker count used when none is configured: available parallelism minus
/// one, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Per-identifier outcomes in catalog order.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    outcomes: Vec<(String, FetchOutcome)>,
}

impl DownloadReport {
    pub fn outcomes(&self) -> &[(String, FetchOutcome)] {
        &self.outcomes
    }

    /// Number of identifiers attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of identifiers whose image is on disk with the expected hash.
    pub fn matched(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvalidUrl> {
        self.outcomes.iter().filter_map(|(_, o)| o.as_ref().err())
    }

    /// Set of invalid-url markers used to drop annotation rows.
    pub fn invalid_urls(&self) -> HashSet<String> {
        self.failures().map(|f| f.url.clone()).collect()
    }
}

fn next_position(work: &Mutex<VecDeque<usize>>) -> Option<usize> {
    work.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}

/// Downloads every image in `catalog` into `output_dir` using at most
/// `workers` threads (clamped to 1..=catalog size).
///
/// Only a panicking worker is an error; per-image failures are in the report.
pub fn download_all(
    catalog: Arc<HashCatalog>,
    output_dir: &Path,
    options: &FetchOptions,
    workers: usize,
) -> Result<DownloadReport> {
    let count = catalog.len();
    if count == 0 {
        return Ok(DownloadReport::default());
    }

    let work: Arc<Mutex<VecDeque<usize>>> = Arc::new(Mutex::new((0..count).collect()));
    let (tx, rx) = mpsc::channel::<(usize, FetchOutcome)>();
    let num_workers = workers.max(1).min(count);
    let options = Arc::new(options.clone());
    tracing::info!(images = count, workers = num_workers, "starting downloads");

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let catalog = Arc::clone(&catalog);
        let options = Arc::clone(&options);
        let dir: PathBuf = output_dir.to_path_buf();
        handles.push(std::thread::spawn(move || {
            while let Some(position) = next_position(&work) {
                let Some((id, hash)) = catalog.get_index(position) else {
                    continue;
                };
                let outcome = fetch(id, hash, &dir, &options);
                if tx.send((position, outcome)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    let mut slots: Vec<Option<FetchOutcome>> = (0..count).map(|_| None).collect();
    let mut done = 0usize;
    for (position, outcome) in rx {
        slots[position] = Some(outcome);
        done += 1;
        if done % PROGRESS_EVERY == 0 {
            tracing::info!(done, total = count, "download progress");
        }
    }
    for h in handles {
        h.join()
            .map_err(|e| anyhow!("download worker panicked: {}", panic_message(e.as_ref())))?;
    }

    let outcomes = catalog
        .iter()
        .zip(slots)
        .map(|((id, _), slot)| {
            slot.map(|o| (id.to_string(), o))
                .ok_or_else(|| anyhow!("no download result for {}", id))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = DownloadReport { outcomes };
    tracing::info!(
        matched = report.matched(),
        total = report.total(),
        "downloads finished"
    );
    Ok(report)
}
