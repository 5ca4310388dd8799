//! In-memory reconciliation ledger.
//!
//! Used when no database is wired in; entries live as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::ReconciliationWarning;
use crate::domain::ports::ReconciliationLedger;

#[derive(Debug, Default)]
pub struct InMemoryReconciliationLedger {
    entries: Mutex<Vec<ReconciliationWarning>>,
}

impl InMemoryReconciliationLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReconciliationLedger for InMemoryReconciliationLedger {
    async fn record(&self, warning: &ReconciliationWarning) -> DomainResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(warning.clone());
        Ok(())
    }

    async fn unresolved(&self) -> DomainResult<Vec<ReconciliationWarning>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|w| !w.is_resolved())
            .cloned()
            .collect())
    }

    async fn resolve(&self, id: Uuid) -> DomainResult<bool> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.iter_mut().find(|w| w.id == id && !w.is_resolved()) {
            Some(entry) => {
                entry.resolved_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
