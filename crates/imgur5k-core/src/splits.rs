//! Train/val/test subsets of the dataset index.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::annotations::AggregatedIndex;

/// A split has the same shape as the full index.
pub type SplitIndex = AggregatedIndex;

/// Parse a newline-delimited identifier list. Lines are trimmed and blank
/// lines skipped.
pub fn read_split_ids<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let id = line.trim();
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Load the identifier list at `path`. A missing file is an error.
pub fn load_split_ids(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("open split list {}", path.display()))?;
    read_split_ids(BufReader::new(file))
        .with_context(|| format!("read split list {}", path.display()))
}

/// Restricts `index` to `ids`, in list order. Ids absent from the index
/// (failed downloads, filtered images) are dropped without error.
pub fn extract_split(index: &AggregatedIndex, ids: &[String]) -> SplitIndex {
    let mut split = SplitIndex::default();
    let mut dropped = 0usize;
    for id in ids {
        let Some(record) = index.index_id.get(id) else {
            dropped += 1;
            continue;
        };
        split.index_id.insert(id.clone(), record.clone());

        let anns = index.index_to_ann_map.get(id).cloned().unwrap_or_default();
        for ann in &anns {
            if let Some(a) = index.ann_id.get(ann) {
                split.ann_id.insert(ann.clone(), a.clone());
            }
        }
        split.index_to_ann_map.insert(id.clone(), anns);
    }
    if dropped > 0 {
        tracing::debug!(dropped, kept = split.images(), "split ids not in index");
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{aggregate, AnnotationRow};
    use crate::catalog::HashCatalog;
    use std::collections::HashSet;

    fn full_index() -> AggregatedIndex {
        let rows: Vec<AnnotationRow> = [("a", "w0"), ("a", "w1"), ("b", "x0"), ("c", "y0")]
            .iter()
            .map(|(id, word)| AnnotationRow {
                source_url: format!("https://i.imgur.com/{id}.jpg"),
                bounding_box: ".".to_string(),
                word: word.to_string(),
            })
            .collect();
        let catalog: HashCatalog = ["a", "b", "c"]
            .iter()
            .map(|id| (id.to_string(), format!("h{id}")))
            .collect();
        aggregate(&rows, &HashSet::new(), &catalog, Path::new("images")).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_is_a_subset_with_identical_values() {
        let index = full_index();
        let split = extract_split(&index, &ids(&["c", "a"]));
        assert_eq!(split.index_id.keys().collect::<Vec<_>>(), vec!["c", "a"]);
        for (id, record) in &split.index_id {
            assert_eq!(record, &index.index_id[id]);
            assert_eq!(split.index_to_ann_map[id], index.index_to_ann_map[id]);
        }
        for (ann, record) in &split.ann_id {
            assert_eq!(record, &index.ann_id[ann]);
        }
        assert_eq!(split.annotations(), 3);
        assert!(split.is_consistent());
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let index = full_index();
        let split = extract_split(&index, &ids(&["missing", "b", "also-missing"]));
        assert_eq!(split.images(), 1);
        assert!(split.index_id.contains_key("b"));
        assert_eq!(split.ann_id.keys().collect::<Vec<_>>(), vec!["b_0"]);
    }

    #[test]
    fn empty_list_gives_empty_split() {
        let split = extract_split(&full_index(), &[]);
        assert_eq!(split, SplitIndex::default());
    }

    #[test]
    fn read_split_ids_trims_and_skips_blanks() {
        let got = read_split_ids(" a1 \n\nb2\r\n".as_bytes()).unwrap();
        assert_eq!(got, vec!["a1", "b2"]);
    }

    #[test]
    fn load_split_ids_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_split_ids(&dir.path().join("train_index_ids.lst")).is_err());
    }
}
