//! Application CLI commands.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Application, ApplicationStatus, LocalFile};
use crate::domain::ports::ApplicationFilter;
use crate::services::{IntakeOutcome, Submission};

use super::asset::WarningOutput;

#[derive(Args, Debug)]
pub struct ApplicationArgs {
    #[command(subcommand)]
    pub command: ApplicationCommands,
}

#[derive(Subcommand, Debug)]
pub enum ApplicationCommands {
    /// Submit a new application
    Submit {
        /// Job the application is for
        #[arg(long)]
        job: String,
        /// Applicant submitting it
        #[arg(long)]
        applicant: String,
        /// Optional cover message
        #[arg(short, long)]
        message: Option<String>,
        /// Path to a CV file to upload
        #[arg(long)]
        cv: Option<PathBuf>,
    },
    /// Show application details
    Show {
        /// Application ID
        id: Uuid,
    },
    /// List applications, most recent first
    List {
        /// Filter by job
        #[arg(long)]
        job: Option<String>,
        /// Filter by applicant
        #[arg(long)]
        applicant: Option<String>,
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
        /// Maximum number of applications to display
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },
    /// Move an application to a new status
    Transition {
        /// Application ID
        id: Uuid,
        /// Target status (reviewed, accepted, rejected)
        status: String,
    },
    /// Upload a new CV and release the previous one
    ReplaceCv {
        /// Application ID
        id: Uuid,
        /// Path to the new CV file
        path: PathBuf,
    },
    /// Release the CV and delete the application
    Withdraw {
        /// Application ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationOutput {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    pub message: Option<String>,
    pub cv_asset_id: Option<String>,
    pub cv_url: Option<String>,
    pub status: String,
    pub applied_at: String,
    pub updated_at: String,
}

impl From<&Application> for ApplicationOutput {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id.to_string(),
            job_id: app.job_id.clone(),
            applicant_id: app.applicant_id.clone(),
            message: app.message.clone(),
            cv_asset_id: app.cv_asset.as_ref().map(|a| a.id.clone()),
            cv_url: app.cv_asset.as_ref().map(|a| a.url.clone()),
            status: app.status.as_str().to_string(),
            applied_at: app.applied_at.to_rfc3339(),
            updated_at: app.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ApplicationListOutput {
    pub applications: Vec<ApplicationOutput>,
    pub total: usize,
}

impl CommandOutput for ApplicationListOutput {
    fn to_human(&self) -> String {
        if self.applications.is_empty() {
            return "No applications found.".to_string();
        }

        let mut lines = vec![format!("Found {} application(s):\n", self.total)];
        lines.push(format!(
            "{:<36} {:<10} {:<16} {:<16} {:<20}",
            "ID", "STATUS", "JOB", "APPLICANT", "APPLIED"
        ));
        lines.push("-".repeat(100));

        for app in &self.applications {
            lines.push(format!(
                "{:<36} {:<10} {:<16} {:<16} {:<20}",
                app.id,
                app.status,
                truncate(&app.job_id, 16),
                truncate(&app.applicant_id, 16),
                truncate(&app.applied_at, 20),
            ));
        }

        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ApplicationDetailOutput {
    pub application: ApplicationOutput,
}

impl CommandOutput for ApplicationDetailOutput {
    fn to_human(&self) -> String {
        let app = &self.application;
        let mut lines = vec![
            format!("Application: {}", app.id),
            format!("Job: {}", app.job_id),
            format!("Applicant: {}", app.applicant_id),
            format!("Status: {}", app.status),
            format!("Applied: {}", app.applied_at),
            format!("Updated: {}", app.updated_at),
        ];

        if let Some(ref message) = app.message {
            lines.push(format!("Message: {}", message));
        }

        match (&app.cv_asset_id, &app.cv_url) {
            (Some(id), Some(url)) => lines.push(format!("CV: {} ({})", id, url)),
            _ => lines.push("CV: none".to_string()),
        }

        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ApplicationActionOutput {
    pub success: bool,
    pub message: String,
    pub application: Option<ApplicationOutput>,
    pub warnings: Vec<WarningOutput>,
}

impl ApplicationActionOutput {
    fn from_outcome(message: String, outcome: &IntakeOutcome) -> Self {
        Self {
            success: true,
            message,
            application: Some(ApplicationOutput::from(&outcome.application)),
            warnings: outcome.warnings.iter().map(WarningOutput::from).collect(),
        }
    }
}

impl CommandOutput for ApplicationActionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        for warning in &self.warnings {
            lines.push(format!(
                "Warning: {} needs reconciliation ({}): {}",
                warning.asset_id.as_deref().unwrap_or("unknown object"),
                warning.id,
                warning.reason
            ));
        }
        lines.join("\n")
    }
}

fn parse_status(value: &str) -> Result<ApplicationStatus> {
    ApplicationStatus::from_str(value).ok_or_else(|| {
        anyhow!(
            "Invalid status: {}. Must be one of: pending, reviewed, accepted, rejected",
            value
        )
    })
}

async fn read_cv(path: &Path) -> Result<LocalFile> {
    LocalFile::read(path)
        .await
        .with_context(|| format!("Failed to read CV file {}", path.display()))
}

pub async fn execute(args: ApplicationArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let intake = &ctx.intake;

    match args.command {
        ApplicationCommands::Submit {
            job,
            applicant,
            message,
            cv,
        } => {
            let mut submission = Submission::new(job, applicant);
            submission.message = message;
            if let Some(path) = cv {
                submission = submission.with_cv(read_cv(&path).await?);
            }

            let outcome = intake.submit(submission).await?;
            let out = ApplicationActionOutput::from_outcome(
                format!("Application submitted: {}", outcome.application.id),
                &outcome,
            );
            output(&out, json_mode);
        }

        ApplicationCommands::Show { id } => {
            let application = intake.store().get(id).await?;
            let out = ApplicationDetailOutput {
                application: ApplicationOutput::from(&application),
            };
            output(&out, json_mode);
        }

        ApplicationCommands::List {
            job,
            applicant,
            status,
            limit,
        } => {
            let filter = ApplicationFilter {
                job_id: job,
                applicant_id: applicant,
                status: status.as_deref().map(parse_status).transpose()?,
                limit: Some(limit),
            };
            let applications = intake.store().list(filter).await?;

            let out = ApplicationListOutput {
                total: applications.len(),
                applications: applications.iter().map(ApplicationOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        ApplicationCommands::Transition { id, status } => {
            let target = parse_status(&status)?;
            let application = intake.transition(id, target).await?;

            let out = ApplicationActionOutput {
                success: true,
                message: format!("Application {} is now {}", application.id, application.status),
                application: Some(ApplicationOutput::from(&application)),
                warnings: vec![],
            };
            output(&out, json_mode);
        }

        ApplicationCommands::ReplaceCv { id, path } => {
            let file = read_cv(&path).await?;
            let outcome = intake.replace_cv(id, &file).await?;
            let out = ApplicationActionOutput::from_outcome(
                format!("CV replaced for application {}", id),
                &outcome,
            );
            output(&out, json_mode);
        }

        ApplicationCommands::Withdraw { id } => {
            let outcome = intake.withdraw(id).await?;
            let out = ApplicationActionOutput::from_outcome(
                format!("Application withdrawn: {}", id),
                &outcome,
            );
            output(&out, json_mode);
        }
    }

    Ok(())
}
