use crate::State;
use crate::store::registry::DeploymentRegistry;
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::deployment::DeploymentStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Dashboard {
    pub total_count: u32,
    pub pending_approval_count: u32,
    pub in_progress_count: u32,
    pub testing_count: u32,
    pub completed_count: u32,
    pub failed_count: u32,
}

impl Dashboard {
    pub fn new(registry: &DeploymentRegistry) -> Self {
        let mut dashboard = Dashboard {
            total_count: 0,
            pending_approval_count: 0,
            in_progress_count: 0,
            testing_count: 0,
            completed_count: 0,
            failed_count: 0,
        };
        for deployment in registry.list() {
            dashboard.total_count += 1;
            match deployment.status {
                DeploymentStatus::PendingApproval => dashboard.pending_approval_count += 1,
                DeploymentStatus::InProgress => dashboard.in_progress_count += 1,
                DeploymentStatus::Testing => dashboard.testing_count += 1,
                DeploymentStatus::Completed => dashboard.completed_count += 1,
                DeploymentStatus::Failed => dashboard.failed_count += 1,
            }
        }
        dashboard
    }
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = StatusCode::OK, description = "Deployment counts by status", body = Dashboard),
    )
)]
pub async fn api(
    Extension(state): Extension<State>,
) -> axum::response::Result<Json<Dashboard>, StatusCode> {
    let dashboard = Dashboard::new(&state.store.registry);
    Ok(Json(dashboard))
}
