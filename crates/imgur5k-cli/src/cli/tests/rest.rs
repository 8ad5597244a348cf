//! Tests for verify and checksum.

use super::parse;
use crate::cli::CliCommand;
use imgur5k_core::checksum::Algorithm;
use std::path::Path;

#[test]
fn cli_parse_verify() {
    match parse(&["imgur5k", "verify", "--output-dir", "imgs"]) {
        CliCommand::Verify {
            dataset_info_dir,
            output_dir,
        } => {
            assert_eq!(dataset_info_dir, Path::new("dataset_info"));
            assert_eq!(output_dir, Path::new("imgs"));
        }
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_checksum_default_md5() {
    match parse(&["imgur5k", "checksum", "/path/to/a1.jpg"]) {
        CliCommand::Checksum { path, algo } => {
            assert_eq!(path, "/path/to/a1.jpg");
            assert_eq!(algo, Algorithm::Md5);
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_sha256() {
    match parse(&["imgur5k", "checksum", "x.bin", "--algo", "sha256"]) {
        CliCommand::Checksum { algo, .. } => assert_eq!(algo, Algorithm::Sha256),
        _ => panic!("expected Checksum with sha256"),
    }
}
