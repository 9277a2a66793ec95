use crate::State;
use crate::error::ApiError;
use crate::event::PublicEvent;
use crate::promotion::promotion_target;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::promotion::VersionPromotionHistory;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const TAG: &str = "promotion";

#[derive(Serialize, Debug, ToSchema)]
pub struct PromotionTarget {
    pub deployment_id: String,
    /// Next pipeline environment the deployment's version can go to, `null`
    /// when no promotion applies.
    pub target: Option<String>,
}

#[utoipa::path(
    get,
    path = "/deployments/{deployment_id}/promotion",
    params(
        ("deployment_id" = String, Path),
    ),
    responses(
        (status = StatusCode::OK, body = PromotionTarget),
        (status = StatusCode::NOT_FOUND, description = "Deployment is not the current record of any slot"),
    ),
    tag = TAG
)]
pub async fn get_promotion_target(
    Path(deployment_id): Path<String>,
    Extension(state): Extension<State>,
) -> Result<Json<PromotionTarget>, ApiError> {
    let deployment = state
        .store
        .registry
        .find_by_id(&deployment_id)
        .ok_or(ApiError::NotFound)?;
    let history = state.store.history.get(&deployment.repo, &deployment.version);
    let target = promotion_target(&deployment, &history, &state.config.pipeline);
    Ok(Json(PromotionTarget {
        deployment_id: deployment.deployment_id,
        target,
    }))
}

/// Acknowledgement that a promotion was requested. Actually carrying it out
/// is the deployment system's job, not ours.
#[derive(Serialize, Debug, ToSchema)]
pub struct PromotionRequest {
    pub deployment_id: String,
    pub repo: String,
    pub version: String,
    pub target: String,
}

#[utoipa::path(
    post,
    path = "/deployments/{deployment_id}/promote",
    params(
        ("deployment_id" = String, Path),
    ),
    responses(
        (status = StatusCode::ACCEPTED, body = PromotionRequest),
        (status = StatusCode::NOT_FOUND, description = "Deployment is not the current record of any slot"),
        (status = StatusCode::CONFLICT, description = "No eligible promotion target"),
    ),
    tag = TAG
)]
pub async fn request_promotion(
    Path(deployment_id): Path<String>,
    Extension(state): Extension<State>,
) -> Result<(StatusCode, Json<PromotionRequest>), ApiError> {
    let deployment = state
        .store
        .registry
        .find_by_id(&deployment_id)
        .ok_or(ApiError::NotFound)?;
    let history = state.store.history.get(&deployment.repo, &deployment.version);
    let Some(target) = promotion_target(&deployment, &history, &state.config.pipeline) else {
        return Err(ApiError::conflict("no eligible promotion target"));
    };

    tracing::info!(
        deployment_id = %deployment.deployment_id,
        repo = %deployment.repo,
        version = %deployment.version,
        %target,
        "promotion requested"
    );
    let _ = state
        .public_events
        .lock()
        .await
        .send(PublicEvent::PromotionRequested {
            deployment_id: deployment.deployment_id.clone(),
            repo: deployment.repo.clone(),
            version: deployment.version.clone(),
            target: target.clone(),
        });

    Ok((
        StatusCode::ACCEPTED,
        Json(PromotionRequest {
            deployment_id: deployment.deployment_id,
            repo: deployment.repo,
            version: deployment.version,
            target,
        }),
    ))
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct VersionQuery {
    pub repo: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/promotions/history",
    params(VersionQuery),
    responses(
        (status = StatusCode::OK, body = VersionPromotionHistory),
    ),
    tag = TAG
)]
pub async fn get_version_history(
    Query(query): Query<VersionQuery>,
    Extension(state): Extension<State>,
) -> Json<VersionPromotionHistory> {
    let history = state.store.history.get(&query.repo, &query.version);
    Json(VersionPromotionHistory {
        repo: query.repo,
        version: query.version,
        history,
    })
}

#[utoipa::path(
    get,
    path = "/environments",
    responses(
        (status = StatusCode::OK, body = Vec<String>),
    ),
    tag = TAG
)]
pub async fn get_environments(Extension(state): Extension<State>) -> Json<Vec<String>> {
    Json(state.config.pipeline.stages().to_vec())
}
