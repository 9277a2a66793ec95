use models::deployment::{
    Deployment, DeploymentEvent, DeploymentStatus, NewDeployment, format_elapsed,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;

pub mod route;

/// A registry record the way list and lookup endpoints hand it out, with the
/// elapsed time recomputed against `now` at query time.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DeploymentSnapshot {
    pub repo: String,
    pub version: String,
    pub environment: String,
    pub status: DeploymentStatus,
    pub deployed_by: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub started_timestamp: chrono::DateTime<chrono::Utc>,
    pub deployment_id: String,
    pub approval_url: Option<String>,
    /// `HH:MM:SS` since `started_timestamp`, clamped at zero.
    pub elapsed_time: String,
}

impl DeploymentSnapshot {
    pub fn at(deployment: Deployment, now: chrono::DateTime<chrono::Utc>) -> Self {
        let elapsed_time = format_elapsed(deployment.elapsed_time(now));
        DeploymentSnapshot {
            repo: deployment.repo,
            version: deployment.version,
            environment: deployment.environment,
            status: deployment.status,
            deployed_by: deployment.deployed_by,
            timestamp: deployment.timestamp,
            started_timestamp: deployment.started_timestamp,
            deployment_id: deployment.deployment_id,
            approval_url: deployment.approval_url,
            elapsed_time,
        }
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct DeploymentFilter {
    /// Repositories to keep, repeatable. Absent or empty keeps every repo.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Environment to keep. Absent or empty keeps every environment.
    pub environment: Option<String>,
}

/// Applies both filter dimensions to a set of registry records. The
/// predicates are ANDed and records keep the order they came in with; an
/// empty filter hands the input back untouched.
pub fn filter_deployments(
    deployments: Vec<Deployment>,
    filter: &DeploymentFilter,
) -> Vec<Deployment> {
    deployments
        .into_iter()
        .filter(|deployment| {
            let repo_match = filter.repos.is_empty() || filter.repos.contains(&deployment.repo);
            let environment_match = match filter.environment.as_deref() {
                None | Some("") => true,
                Some(environment) => deployment.environment == environment,
            };
            repo_match && environment_match
        })
        .collect()
}

/// Creates the deployment record for its `(repo, environment)` slot and
/// opens its event timeline with an initiation entry.
pub fn initiate(
    store: &Store,
    request: NewDeployment,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Deployment, ApiError> {
    let status = request.status.unwrap_or(DeploymentStatus::InProgress);
    if !status.is_initial() {
        return Err(ApiError::bad_request(format!(
            "a deployment cannot be initiated as '{status}'"
        )));
    }

    let deployment = Deployment {
        repo: request.repo,
        version: request.version,
        environment: request.environment,
        status: status.clone(),
        deployed_by: request.deployed_by,
        timestamp: now,
        started_timestamp: now,
        deployment_id: Uuid::new_v4().to_string(),
        approval_url: request.approval_url,
    };

    if let Some(superseded) = store.registry.upsert(deployment.clone()) {
        tracing::info!(
            repo = %deployment.repo,
            environment = %deployment.environment,
            superseded = %superseded.deployment_id,
            replacement = %deployment.deployment_id,
            "deployment slot superseded"
        );
    }

    let message = request
        .message
        .unwrap_or_else(|| format!("Deployment initiated by {}", deployment.deployed_by));
    store.events.append(DeploymentEvent {
        deployment_id: deployment.deployment_id.clone(),
        repo: deployment.repo.clone(),
        environment: deployment.environment.clone(),
        timestamp: now,
        status,
        message: Some(message),
        approval_url: deployment.approval_url.clone(),
    });

    Ok(deployment)
}
