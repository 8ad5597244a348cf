//! Single-image fetch with integrity check.
//!
//! One GET per identifier, no retry. The body is buffered so undersized
//! responses (error pages) never touch the disk; otherwise it is written to
//! `output_dir/{id}.jpg` and the written file is hashed against the expected
//! MD5. Any failure leaves no `{id}.jpg` behind, including one from an
//! earlier run.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checksum;
use crate::config::{DEFAULT_MIN_BODY_BYTES, DEFAULT_USER_AGENT};
use crate::layout::image_path;
use crate::url_model::UrlTemplate;

/// Per-request settings shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub url_template: UrlTemplate,
    pub user_agent: String,
    /// Bodies shorter than this count as a failed retrieval.
    pub min_body_bytes: usize,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    /// Reuse an existing `{id}.jpg` whose hash already matches instead of downloading.
    pub skip_verified: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            url_template: UrlTemplate::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
            connect_timeout: None,
            timeout: None,
            skip_verified: false,
        }
    }
}

/// Image saved and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub path: PathBuf,
    /// True when an already verified file was kept without a request.
    pub reused: bool,
}

/// Why an identifier's URL was marked invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// Response body shorter than the minimum; nothing was written and any earlier file removed.
    Undersized { len: usize },
    /// File written but its hash differs from the reference; file removed.
    HashMismatch { expected: String, actual: String },
    /// Request never completed (DNS, connect, TLS, timeout).
    Transport(String),
    /// Image could not be written or re-read locally.
    Storage(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Undersized { len } => write!(f, "retrieval failed ({} bytes)", len),
            InvalidReason::HashMismatch { expected, actual } => {
                write!(f, "ref hash: {} != cur hash: {}", expected, actual)
            }
            InvalidReason::Transport(e) => write!(f, "request failed: {}", e),
            InvalidReason::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

/// Invalid-url marker: the constructed URL of a failed or corrupted download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUrl {
    pub url: String,
    pub reason: InvalidReason,
}

impl fmt::Display for InvalidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

impl std::error::Error for InvalidUrl {}

/// Outcome of one fetch; failures are data, not run errors.
pub type FetchOutcome = Result<Saved, InvalidUrl>;

/// Fetches one image, saves it as `output_dir/{id}.jpg` and checks its MD5.
pub fn fetch(id: &str, expected_hash: &str, output_dir: &Path, options: &FetchOptions) -> FetchOutcome {
    let url = options.url_template.render(id);
    let path = image_path(output_dir, id);
    let invalid = |reason: InvalidReason| InvalidUrl {
        url: url.clone(),
        reason,
    };

    if options.skip_verified && checksum::file_matches_md5(&path, expected_hash) {
        tracing::debug!(id, "already verified, skipping request");
        return Ok(Saved { path, reused: true });
    }

    let body = match get_body(&url, options) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(id, %url, "GET failed: {:#}", e);
            remove_quietly(&path);
            return Err(invalid(InvalidReason::Transport(format!("{:#}", e))));
        }
    };

    if body.len() < options.min_body_bytes {
        tracing::warn!(id, %url, bytes = body.len(), "URL retrieval for {} failed", id);
        remove_quietly(&path);
        return Err(invalid(InvalidReason::Undersized { len: body.len() }));
    }

    if let Err(e) = fs::write(&path, &body) {
        tracing::warn!(id, path = %path.display(), "write failed: {}", e);
        remove_quietly(&path);
        return Err(invalid(InvalidReason::Storage(e.to_string())));
    }

    let actual = match checksum::md5_path(&path) {
        Ok(h) => h,
        Err(e) => {
            remove_quietly(&path);
            return Err(invalid(InvalidReason::Storage(format!("{:#}", e))));
        }
    };

    if !actual.eq_ignore_ascii_case(expected_hash) {
        tracing::warn!(
            "For IMG: {}, ref hash: {} != cur hash: {}",
            id,
            expected_hash,
            actual
        );
        remove_quietly(&path);
        return Err(invalid(InvalidReason::HashMismatch {
            expected: expected_hash.to_string(),
            actual,
        }));
    }

    Ok(Saved { path, reused: false })
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "could not remove file: {}", e);
        }
    }
}

/// Single GET returning the whole body. Status codes are logged but not
/// rejected; the length and hash checks decide.
fn get_body(url: &str, options: &FetchOptions) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&options.user_agent)?;
    if let Some(t) = options.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = options.timeout {
        easy.timeout(t)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    tracing::debug!(url, code, bytes = body.len(), "GET finished");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let u = InvalidUrl {
            url: "https://i.imgur.com/a1.jpg".to_string(),
            reason: InvalidReason::Undersized { len: 50 },
        };
        assert_eq!(
            u.to_string(),
            "https://i.imgur.com/a1.jpg: retrieval failed (50 bytes)"
        );
        let u = InvalidUrl {
            url: "https://i.imgur.com/b2.jpg".to_string(),
            reason: InvalidReason::HashMismatch {
                expected: "aa".to_string(),
                actual: "bb".to_string(),
            },
        };
        assert!(u.to_string().ends_with("ref hash: aa != cur hash: bb"));
    }

    #[test]
    fn skip_verified_reuses_matching_file_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let body = vec![7u8; 256];
        std::fs::write(dir.path().join("keep.jpg"), &body).unwrap();
        let opts = FetchOptions {
            // Nothing listens on port 9; a request would fail.
            url_template: UrlTemplate::new("http://127.0.0.1:9/{id}.jpg").unwrap(),
            skip_verified: true,
            ..FetchOptions::default()
        };
        let outcome = fetch("keep", &checksum::md5_bytes(&body), dir.path(), &opts);
        assert_eq!(
            outcome,
            Ok(Saved {
                path: dir.path().join("keep.jpg"),
                reused: true
            })
        );
    }

    #[test]
    fn connection_refused_is_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let opts = FetchOptions {
            url_template: UrlTemplate::new("http://127.0.0.1:9/{id}.jpg").unwrap(),
            connect_timeout: Some(Duration::from_secs(5)),
            ..FetchOptions::default()
        };
        let err = fetch("gone", "d41d8cd98f00b204e9800998ecf8427e", dir.path(), &opts).unwrap_err();
        assert_eq!(err.url, "http://127.0.0.1:9/gone.jpg");
        assert!(matches!(err.reason, InvalidReason::Transport(_)));
        assert!(!dir.path().join("gone.jpg").exists());
    }

    #[test]
    fn transport_failure_removes_file_from_earlier_run() {
        let dir = tempfile::tempdir().unwrap();
        let body = vec![3u8; 256];
        std::fs::write(dir.path().join("old.jpg"), &body).unwrap();
        let opts = FetchOptions {
            url_template: UrlTemplate::new("http://127.0.0.1:9/{id}.jpg").unwrap(),
            connect_timeout: Some(Duration::from_secs(5)),
            ..FetchOptions::default()
        };
        let err = fetch("old", &checksum::md5_bytes(&body), dir.path(), &opts).unwrap_err();
        assert!(matches!(err.reason, InvalidReason::Transport(_)));
        assert!(!dir.path().join("old.jpg").exists());
    }
}
