//! Application domain model.
//!
//! An application is one applicant's submission to one job posting. It moves
//! through a small review state machine and may reference a CV stored in the
//! remote media service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::AssetRef;

/// Review status of an application.
///
/// The serialized values are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, not yet looked at
    Pending,
    /// Seen by a reviewer, no decision yet
    Reviewed,
    /// Accepted (terminal)
    Accepted,
    /// Rejected (terminal)
    Rejected,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApplicationStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Reviewed, Self::Accepted, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Valid transitions from this status.
    ///
    /// A reviewer may decide directly from `pending` without marking the
    /// application as reviewed first.
    pub fn valid_transitions(&self) -> Vec<ApplicationStatus> {
        match self {
            Self::Pending => vec![Self::Reviewed, Self::Accepted, Self::Rejected],
            Self::Reviewed => vec![Self::Accepted, Self::Rejected],
            Self::Accepted => vec![],
            Self::Rejected => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Input for creating an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub job_id: String,
    pub applicant_id: String,
    pub message: Option<String>,
    pub cv_asset: Option<AssetRef>,
}

impl NewApplication {
    pub fn new(job_id: impl Into<String>, applicant_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            applicant_id: applicant_id.into(),
            message: None,
            cv_asset: None,
        }
    }

    /// Set the cover message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the CV asset.
    pub fn with_cv_asset(mut self, asset: AssetRef) -> Self {
        self.cv_asset = Some(asset);
        self
    }

    /// Validate required references.
    pub fn validate(&self) -> Result<(), String> {
        if self.job_id.trim().is_empty() {
            return Err("jobId is required".to_string());
        }
        if self.applicant_id.trim().is_empty() {
            return Err("applicantId is required".to_string());
        }
        Ok(())
    }
}

/// A submitted application.
///
/// Serialized field names are part of the external contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Unique identifier
    pub id: Uuid,
    /// Job posting this application targets
    pub job_id: String,
    /// Applicant who submitted it
    pub applicant_id: String,
    /// Optional cover message, trimmed
    pub message: Option<String>,
    /// CV stored in the remote media service
    pub cv_asset: Option<AssetRef>,
    /// Current review status
    pub status: ApplicationStatus,
    /// When the applicant applied
    pub applied_at: DateTime<Utc>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated
    pub updated_at: DateTime<Utc>,
    /// Version for optimistic locking
    #[serde(skip)]
    pub version: u64,
}

impl Application {
    /// Build a fresh `pending` application from validated input.
    pub fn from_new(input: NewApplication) -> Result<Self, String> {
        input.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            job_id: input.job_id.trim().to_string(),
            applicant_id: input.applicant_id.trim().to_string(),
            message: normalize_message(input.message),
            cv_asset: input.cv_asset,
            status: ApplicationStatus::default(),
            applied_at: now,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: ApplicationStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to new status.
    pub fn transition_to(&mut self, new_status: ApplicationStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.touch();
        Ok(())
    }

    /// Swap the CV reference.
    pub fn replace_cv(&mut self, asset: Option<AssetRef>) {
        self.cv_asset = asset;
        self.touch();
    }

    /// Check if the application has reached a decision.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

/// Trim a message, dropping it entirely when nothing remains.
fn normalize_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
