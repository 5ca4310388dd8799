//! Infrastructure adapters for external systems.

pub mod ledger;
pub mod media;
pub mod sqlite;
