//! CLI command implementations.

pub mod application;
pub mod asset;
pub mod init;
