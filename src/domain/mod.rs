//! Domain layer for Hireflow
//!
//! This module contains the application lifecycle model, the asset
//! reference model, and the ports adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{AssetError, DomainError, DomainResult};
