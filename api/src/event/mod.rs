pub mod route;

use chrono::Utc;
use models::deployment::{Deployment, DeploymentEvent, DeploymentStatus, NewDeploymentEvent};
use models::promotion::EnvironmentPipeline;
use serde::Serialize;

use crate::store::Store;
use crate::store::history::CompletionOutcome;

/// Events pushed to stream subscribers whenever one of the write paths
/// lands something.
#[derive(Debug, Clone, Serialize)]
pub enum PublicEvent {
    DeploymentInitiated {
        deployment_id: String,
        repo: String,
        environment: String,
        version: String,
    },
    StatusChanged {
        deployment_id: String,
        repo: String,
        environment: String,
        status: DeploymentStatus,
    },
    PromotionRequested {
        deployment_id: String,
        repo: String,
        version: String,
        target: String,
    },
    ApprovalRequested {
        deployment_id: String,
        approval_url: String,
    },
}

pub struct IngestOutcome {
    pub event: DeploymentEvent,
    /// The updated registry record, present when the event belonged to the
    /// slot's current deployment and was not stale.
    pub projected: Option<Deployment>,
}

/// Takes one raw event in: appends it to the log unconditionally, folds it
/// into its registry slot when it belongs there, and records pipeline
/// completion when the fold lands a `completed` status.
///
/// A completion that falls outside pipeline order is logged and dropped on
/// the history side only; the event itself is already stored by then and
/// ingestion still succeeds.
pub fn ingest(
    store: &Store,
    pipeline: &EnvironmentPipeline,
    request: NewDeploymentEvent,
) -> IngestOutcome {
    let event = DeploymentEvent {
        deployment_id: request.deployment_id,
        repo: request.repo,
        environment: request.environment,
        timestamp: request.timestamp.unwrap_or_else(Utc::now),
        status: request.status,
        message: request.message,
        approval_url: request.approval_url,
    };
    store.events.append(event.clone());

    let Some(projection) = store.registry.project_event(&event) else {
        tracing::debug!(
            deployment_id = %event.deployment_id,
            repo = %event.repo,
            environment = %event.environment,
            "event stored without touching the registry"
        );
        return IngestOutcome {
            event,
            projected: None,
        };
    };

    if projection.newly_completed {
        let deployment = &projection.deployment;
        match store.history.record_completion(
            &deployment.repo,
            &deployment.version,
            &deployment.environment,
            pipeline,
        ) {
            Ok(CompletionOutcome::Appended) => tracing::info!(
                repo = %deployment.repo,
                version = %deployment.version,
                environment = %deployment.environment,
                "version completed a pipeline stage"
            ),
            Ok(CompletionOutcome::AlreadyRecorded) => tracing::debug!(
                repo = %deployment.repo,
                version = %deployment.version,
                environment = %deployment.environment,
                "duplicate completion signal absorbed"
            ),
            Err(err) => tracing::warn!(
                repo = %deployment.repo,
                version = %deployment.version,
                %err,
                "completion outside pipeline order; history unchanged"
            ),
        }
    }

    IngestOutcome {
        event,
        projected: Some(projection.deployment),
    }
}
