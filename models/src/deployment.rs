use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStatus {
    PendingApproval,
    InProgress,
    Testing,
    Completed,
    Failed,
}

impl DeploymentStatus {
    /// Statuses a deployment is allowed to start out in. Everything else is
    /// only reachable through events.
    pub fn is_initial(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::PendingApproval | DeploymentStatus::InProgress
        )
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentStatus::PendingApproval => write!(f, "pending-approval"),
            DeploymentStatus::InProgress => write!(f, "in-progress"),
            DeploymentStatus::Testing => write!(f, "testing"),
            DeploymentStatus::Completed => write!(f, "completed"),
            DeploymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One immutable entry in a deployment's timeline.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DeploymentEvent {
    pub deployment_id: String,
    pub repo: String,
    pub environment: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: DeploymentStatus,
    pub message: Option<String>,
    pub approval_url: Option<String>,
}

/// Current state of the deployment occupying a `(repo, environment)` slot.
///
/// `timestamp` tracks the latest event folded into the record;
/// `started_timestamp` never moves after initiation.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Deployment {
    pub repo: String,
    pub version: String,
    pub environment: String,
    pub status: DeploymentStatus,
    pub deployed_by: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub started_timestamp: chrono::DateTime<chrono::Utc>,
    pub deployment_id: String,
    pub approval_url: Option<String>,
}

impl Deployment {
    /// Time since the deployment started. Clamped to zero when
    /// `started_timestamp` is ahead of `now`, which happens with skewed
    /// clocks on the emitting side.
    pub fn elapsed_time(&self, now: chrono::DateTime<chrono::Utc>) -> chrono::Duration {
        let elapsed = now.signed_duration_since(self.started_timestamp);
        if elapsed < chrono::Duration::zero() {
            chrono::Duration::zero()
        } else {
            elapsed
        }
    }
}

/// Formats a duration as `HH:MM:SS`. Hours do not wrap at 24, so a four day
/// old deployment shows up as `96:00:00`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct NewDeployment {
    pub repo: String,
    pub version: String,
    pub environment: String,
    pub deployed_by: String,
    /// Initial status, `in-progress` when omitted. Only `pending-approval`
    /// and `in-progress` are accepted here.
    pub status: Option<DeploymentStatus>,
    pub message: Option<String>,
    pub approval_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct NewDeploymentEvent {
    pub deployment_id: String,
    pub repo: String,
    pub environment: String,
    /// Falls back to the ingestion time when the emitting system does not
    /// timestamp its events.
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub status: DeploymentStatus,
    pub message: Option<String>,
    pub approval_url: Option<String>,
}
