//! Remote asset reconciliation commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::ReconciliationWarning;

#[derive(Args, Debug)]
pub struct AssetArgs {
    #[command(subcommand)]
    pub command: AssetCommands,
}

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// List remote objects awaiting manual reconciliation
    Reconcile,
    /// Mark a reconciliation entry as handled
    Resolve {
        /// Reconciliation entry ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct WarningOutput {
    pub id: String,
    pub kind: String,
    pub asset_id: Option<String>,
    pub namespace: String,
    pub reason: String,
    pub recorded_at: String,
}

impl From<&ReconciliationWarning> for WarningOutput {
    fn from(w: &ReconciliationWarning) -> Self {
        Self {
            id: w.id.to_string(),
            kind: w.kind.as_str().to_string(),
            asset_id: w.asset_id.clone(),
            namespace: w.namespace.clone(),
            reason: w.reason.clone(),
            recorded_at: w.recorded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ReconcileOutput {
    pub pending: Vec<WarningOutput>,
    pub total: usize,
}

impl CommandOutput for ReconcileOutput {
    fn to_human(&self) -> String {
        if self.pending.is_empty() {
            return "Nothing to reconcile.".to_string();
        }

        let mut lines = vec![format!("{} object(s) need reconciliation:\n", self.total)];
        lines.push(format!(
            "{:<36} {:<15} {:<30} {:<40}",
            "ID", "KIND", "ASSET", "REASON"
        ));
        lines.push("-".repeat(124));

        for w in &self.pending {
            lines.push(format!(
                "{:<36} {:<15} {:<30} {:<40}",
                w.id,
                w.kind,
                truncate(w.asset_id.as_deref().unwrap_or("-"), 30),
                truncate(&w.reason, 40),
            ));
        }

        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ResolveOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: AssetArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let assets = ctx.intake.assets();

    match args.command {
        AssetCommands::Reconcile => {
            let pending = assets.pending_reconciliation().await?;
            let out = ReconcileOutput {
                total: pending.len(),
                pending: pending.iter().map(WarningOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        AssetCommands::Resolve { id } => {
            let resolved = assets.resolve(id).await?;
            let out = ResolveOutput {
                success: resolved,
                message: if resolved {
                    format!("Reconciliation entry resolved: {}", id)
                } else {
                    format!("No open reconciliation entry with id {}", id)
                },
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
