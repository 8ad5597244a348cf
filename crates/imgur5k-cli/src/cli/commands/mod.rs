//! CLI command handlers. Each command is in its own file.

mod checksum;
mod download;
mod verify;

pub use checksum::run_checksum;
pub use download::run_download;
pub use verify::run_verify;
