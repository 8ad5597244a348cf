//! Annotation table parsing and aggregation into the dataset index.
//!
//! The annotation table has one tab-separated row per word:
//! `source_url<TAB>bounding_box<TAB>word`. A bounding box of `.` means the
//! word was not annotated; such rows are still indexed.
//!
//! The index has three parts, serialized under fixed keys:
//! - `index_id`: image id → [`ImageRecord`]
//! - `index_to_ann_map`: image id → annotation ids in row order
//! - `ann_id`: annotation id → [`AnnotationRecord`]

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::catalog::HashCatalog;
use crate::error::AnnotationError;
use crate::layout::image_path;
use crate::url_model::identifier_from_url;

/// Bounding box value for words without an annotation.
pub const NO_BOUNDING_BOX: &str = ".";

const COLUMNS: usize = 3;

/// One row of the annotation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRow {
    pub source_url: String,
    pub bounding_box: String,
    pub word: String,
}

/// Per-image record, created the first time an image id is seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_url: String,
    #[serde(rename = "image_path")]
    pub local_path: String,
    #[serde(rename = "image_hash")]
    pub expected_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub word: String,
    pub bounding_box: String,
}

/// Full dataset index. Key order follows first appearance in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedIndex {
    pub index_id: IndexMap<String, ImageRecord>,
    pub index_to_ann_map: IndexMap<String, Vec<String>>,
    pub ann_id: IndexMap<String, AnnotationRecord>,
}

/// Annotation id for the `n`-th (0-based) word of image `id`.
pub fn annotation_id(id: &str, n: usize) -> String {
    format!("{id}_{n}")
}

impl AggregatedIndex {
    /// Number of indexed images.
    pub fn images(&self) -> usize {
        self.index_id.len()
    }

    /// Number of indexed annotations.
    pub fn annotations(&self) -> usize {
        self.ann_id.len()
    }

    /// Every listed annotation id resolves in `ann_id` and every listed image
    /// id resolves in `index_id`.
    pub fn is_consistent(&self) -> bool {
        self.index_to_ann_map.iter().all(|(id, anns)| {
            self.index_id.contains_key(id) && anns.iter().all(|a| self.ann_id.contains_key(a))
        })
    }

    /// Write as JSON with 4-space indentation.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut ser)
            .with_context(|| format!("serialize {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

/// Parse the tab-separated annotation table. Blank lines are skipped; a row
/// with any other column count is a fatal error.
pub fn parse_annotation_table<R: BufRead>(reader: R) -> Result<Vec<AnnotationRow>, AnnotationError> {
    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != COLUMNS {
            return Err(AnnotationError::Malformed {
                line: n + 1,
                columns: cols.len(),
            });
        }
        rows.push(AnnotationRow {
            source_url: cols[0].to_string(),
            bounding_box: cols[1].to_string(),
            word: cols[2].to_string(),
        });
    }
    Ok(rows)
}

/// Load and parse the annotation table at `path`.
pub fn load_annotation_table(path: &Path) -> Result<Vec<AnnotationRow>, AnnotationError> {
    let file = File::open(path).map_err(|source| AnnotationError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_annotation_table(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded annotation table");
    Ok(rows)
}

/// Builds the dataset index from annotation rows in table order.
///
/// Rows whose `source_url` is an invalid-url marker are skipped. An image id
/// gets its [`ImageRecord`] the first time it appears; rows for an id need not
/// be contiguous. Each row appends annotation `{id}_{n}` where `n` counts the
/// annotations already attached to that id.
pub fn aggregate(
    rows: &[AnnotationRow],
    invalid_urls: &HashSet<String>,
    catalog: &HashCatalog,
    output_dir: &Path,
) -> Result<AggregatedIndex, AnnotationError> {
    let mut index = AggregatedIndex::default();
    let mut skipped = 0usize;

    for row in rows {
        if invalid_urls.contains(&row.source_url) {
            skipped += 1;
            continue;
        }

        let id = identifier_from_url(&row.source_url);
        if !index.index_id.contains_key(id) {
            let expected_hash =
                catalog
                    .get(id)
                    .ok_or_else(|| AnnotationError::UnknownIdentifier {
                        id: id.to_string(),
                        url: row.source_url.clone(),
                    })?;
            index.index_id.insert(
                id.to_string(),
                ImageRecord {
                    image_url: row.source_url.clone(),
                    local_path: image_path(output_dir, id).to_string_lossy().into_owned(),
                    expected_hash: expected_hash.to_string(),
                },
            );
        }

        let anns = index.index_to_ann_map.entry(id.to_string()).or_default();
        let ann = annotation_id(id, anns.len());
        anns.push(ann.clone());
        index.ann_id.insert(
            ann,
            AnnotationRecord {
                word: row.word.clone(),
                bounding_box: row.bounding_box.clone(),
            },
        );
    }

    tracing::debug!(
        images = index.images(),
        annotations = index.annotations(),
        skipped,
        "aggregated annotations"
    );
    Ok(index)
}
