use crate::State;
use crate::deployment::{DeploymentFilter, DeploymentSnapshot, filter_deployments, initiate};
use crate::error::ApiError;
use crate::event::PublicEvent;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::Query as ExtraQuery;
use chrono::Utc;
use models::deployment::{DeploymentStatus, NewDeployment};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const TAG: &str = "deployment";

#[utoipa::path(
    get,
    path = "/deployments",
    params(DeploymentFilter),
    responses(
        (status = StatusCode::OK, body = Vec<DeploymentSnapshot>),
    ),
    tag = TAG
)]
pub async fn get_deployments(
    ExtraQuery(filter): ExtraQuery<DeploymentFilter>,
    Extension(state): Extension<State>,
) -> Json<Vec<DeploymentSnapshot>> {
    let now = Utc::now();
    let deployments = filter_deployments(state.store.registry.list(), &filter);
    Json(
        deployments
            .into_iter()
            .map(|deployment| DeploymentSnapshot::at(deployment, now))
            .collect(),
    )
}

#[utoipa::path(
    post,
    path = "/deployments",
    request_body = NewDeployment,
    responses(
        (status = StatusCode::CREATED, body = DeploymentSnapshot),
        (status = StatusCode::BAD_REQUEST, description = "Status is not valid at initiation"),
    ),
    tag = TAG
)]
pub async fn create_deployment(
    Extension(state): Extension<State>,
    Json(request): Json<NewDeployment>,
) -> Result<(StatusCode, Json<DeploymentSnapshot>), ApiError> {
    let now = Utc::now();
    let deployment = initiate(&state.store, request, now).inspect_err(|e| {
        tracing::warn!("Rejected deployment initiation: {e:?}");
    })?;

    let _ = state
        .public_events
        .lock()
        .await
        .send(PublicEvent::DeploymentInitiated {
            deployment_id: deployment.deployment_id.clone(),
            repo: deployment.repo.clone(),
            environment: deployment.environment.clone(),
            version: deployment.version.clone(),
        });

    Ok((
        StatusCode::CREATED,
        Json(DeploymentSnapshot::at(deployment, now)),
    ))
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct SlotQuery {
    pub repo: String,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/deployments/current",
    params(SlotQuery),
    responses(
        (status = StatusCode::OK, body = DeploymentSnapshot),
        (status = StatusCode::NOT_FOUND, description = "Nothing deployed to this slot yet"),
    ),
    tag = TAG
)]
pub async fn get_current_deployment(
    Query(slot): Query<SlotQuery>,
    Extension(state): Extension<State>,
) -> Result<Json<DeploymentSnapshot>, ApiError> {
    let deployment = state
        .store
        .registry
        .get(&slot.repo, &slot.environment)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DeploymentSnapshot::at(deployment, Utc::now())))
}

#[utoipa::path(
    get,
    path = "/deployments/{deployment_id}",
    params(
        ("deployment_id" = String, Path),
    ),
    responses(
        (status = StatusCode::OK, body = DeploymentSnapshot),
        (status = StatusCode::NOT_FOUND, description = "Deployment is not the current record of any slot"),
    ),
    tag = TAG
)]
pub async fn get_deployment_by_id(
    Path(deployment_id): Path<String>,
    Extension(state): Extension<State>,
) -> Result<Json<DeploymentSnapshot>, ApiError> {
    let deployment = state
        .store
        .registry
        .find_by_id(&deployment_id)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DeploymentSnapshot::at(deployment, Utc::now())))
}

/// Acknowledgement that an approval was requested; the actual sign-off
/// happens behind `approval_url`.
#[derive(Serialize, Debug, ToSchema)]
pub struct ApprovalRequest {
    pub deployment_id: String,
    pub approval_url: String,
}

#[utoipa::path(
    post,
    path = "/deployments/{deployment_id}/approval",
    params(
        ("deployment_id" = String, Path),
    ),
    responses(
        (status = StatusCode::ACCEPTED, body = ApprovalRequest),
        (status = StatusCode::NOT_FOUND, description = "Deployment is not the current record of any slot"),
        (status = StatusCode::CONFLICT, description = "Deployment is not awaiting approval"),
    ),
    tag = TAG
)]
pub async fn request_approval(
    Path(deployment_id): Path<String>,
    Extension(state): Extension<State>,
) -> Result<(StatusCode, Json<ApprovalRequest>), ApiError> {
    let deployment = state
        .store
        .registry
        .find_by_id(&deployment_id)
        .ok_or(ApiError::NotFound)?;
    if deployment.status != DeploymentStatus::PendingApproval {
        return Err(ApiError::conflict("deployment is not awaiting approval"));
    }
    let Some(approval_url) = deployment.approval_url else {
        return Err(ApiError::conflict("deployment has no approval url"));
    };

    tracing::info!(
        deployment_id = %deployment.deployment_id,
        repo = %deployment.repo,
        environment = %deployment.environment,
        "approval requested"
    );
    let _ = state
        .public_events
        .lock()
        .await
        .send(PublicEvent::ApprovalRequested {
            deployment_id: deployment.deployment_id.clone(),
            approval_url: approval_url.clone(),
        });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApprovalRequest {
            deployment_id: deployment.deployment_id,
            approval_url,
        }),
    ))
}
