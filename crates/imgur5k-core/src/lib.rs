pub mod config;
pub mod error;
pub mod logging;

pub mod annotations;
pub mod catalog;
pub mod checksum;
pub mod downloader;
pub mod fetch;
pub mod layout;
pub mod pipeline;
pub mod splits;
pub mod url_model;
