//! Expected content hashes, one per image identifier.
//!
//! Source format: one `identifier<whitespace>hash` pair per line.

use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CatalogError;

/// Identifier → expected MD5 hex digest, in first-seen order.
///
/// A repeated identifier replaces the earlier hash but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashCatalog {
    hashes: IndexMap<String, String>,
}

impl HashCatalog {
    /// Parse a hash list. Blank lines are skipped; any line that is not
    /// exactly two tokens is a fatal error.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, CatalogError> {
        let mut hashes = IndexMap::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next(), tokens.next()) {
                (None, _, _) => continue,
                (Some(id), Some(hash), None) => {
                    if hashes.insert(id.to_string(), hash.to_string()).is_some() {
                        tracing::debug!(id, line = n + 1, "duplicate id in hash list, last wins");
                    }
                }
                _ => {
                    return Err(CatalogError::Malformed {
                        line: n + 1,
                        content: line.clone(),
                    })
                }
            }
        }
        Ok(Self { hashes })
    }

    /// Load and parse the hash list at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), images = catalog.len(), "loaded hash list");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.hashes.get(id).map(String::as_str)
    }

    /// Entry at `position` in catalog order.
    pub fn get_index(&self, position: usize) -> Option<(&str, &str)> {
        self.hashes
            .get_index(position)
            .map(|(id, hash)| (id.as_str(), hash.as_str()))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hashes.iter().map(|(id, hash)| (id.as_str(), hash.as_str()))
    }
}

impl FromIterator<(String, String)> for HashCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            hashes: iter.into_iter().collect(),
        }
    }
}
