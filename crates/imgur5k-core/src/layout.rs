//! File layout of the dataset info directory and the image output directory.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATASET_INFO_DIR: &str = "dataset_info";
pub const DEFAULT_OUTPUT_DIR: &str = "images";

pub const HASH_LIST_FILE: &str = "imgur5k_hashes.lst";
pub const ANNOTATION_TABLE_FILE: &str = "imgur5k_data.lst";
pub const ANNOTATIONS_JSON_FILE: &str = "imgur5k_annotations.json";

/// Extension of saved images (`{id}.jpg`).
pub const IMAGE_EXTENSION: &str = "jpg";

/// Local path for a downloaded image: `output_dir/{id}.jpg`.
pub fn image_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.{IMAGE_EXTENSION}"))
}

/// Resolves every input and output path of a run.
///
/// Inputs and JSON outputs live in the dataset info dir; images go to the
/// output dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    dataset_info_dir: PathBuf,
    output_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(dataset_info_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_info_dir: dataset_info_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn dataset_info_dir(&self) -> &Path {
        &self.dataset_info_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn hash_list(&self) -> PathBuf {
        self.dataset_info_dir.join(HASH_LIST_FILE)
    }

    pub fn annotation_table(&self) -> PathBuf {
        self.dataset_info_dir.join(ANNOTATION_TABLE_FILE)
    }

    pub fn annotations_json(&self) -> PathBuf {
        self.dataset_info_dir.join(ANNOTATIONS_JSON_FILE)
    }

    /// Identifier list for a split, e.g. `train_index_ids.lst`.
    pub fn split_ids(&self, split: &str) -> PathBuf {
        self.dataset_info_dir.join(format!("{split}_index_ids.lst"))
    }

    /// Split index output, e.g. `imgur5k_annotations_train.json`.
    pub fn split_json(&self, split: &str) -> PathBuf {
        self.dataset_info_dir
            .join(format!("imgur5k_annotations_{split}.json"))
    }

    pub fn image_path(&self, id: &str) -> PathBuf {
        image_path(&self.output_dir, id)
    }
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_INFO_DIR, DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let l = DatasetLayout::default();
        assert_eq!(l.hash_list(), Path::new("dataset_info/imgur5k_hashes.lst"));
        assert_eq!(
            l.annotation_table(),
            Path::new("dataset_info/imgur5k_data.lst")
        );
        assert_eq!(
            l.annotations_json(),
            Path::new("dataset_info/imgur5k_annotations.json")
        );
        assert_eq!(l.image_path("a1"), Path::new("images/a1.jpg"));
    }

    #[test]
    fn split_paths() {
        let l = DatasetLayout::new("/data/info", "/data/img");
        assert_eq!(
            l.split_ids("val"),
            Path::new("/data/info/val_index_ids.lst")
        );
        assert_eq!(
            l.split_json("val"),
            Path::new("/data/info/imgur5k_annotations_val.json")
        );
    }
}
