use crate::State;
use crate::event::{PublicEvent, ingest};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Extension, Json};
use models::deployment::{DeploymentEvent, NewDeploymentEvent};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

const TAG: &str = "event";

#[utoipa::path(
    post,
    path = "/events",
    request_body = NewDeploymentEvent,
    responses(
        (status = StatusCode::CREATED, body = DeploymentEvent),
    ),
    tag = TAG
)]
pub async fn ingest_event(
    Extension(state): Extension<State>,
    Json(request): Json<NewDeploymentEvent>,
) -> (StatusCode, Json<DeploymentEvent>) {
    let outcome = ingest(&state.store, &state.config.pipeline, request);

    if let Some(deployment) = &outcome.projected {
        let _ = state
            .public_events
            .lock()
            .await
            .send(PublicEvent::StatusChanged {
                deployment_id: deployment.deployment_id.clone(),
                repo: deployment.repo.clone(),
                environment: deployment.environment.clone(),
                status: deployment.status.clone(),
            });
    }

    (StatusCode::CREATED, Json(outcome.event))
}

#[utoipa::path(
    get,
    path = "/deployments/{deployment_id}/events",
    params(
        ("deployment_id" = String, Path),
    ),
    responses(
        (status = StatusCode::OK, body = Vec<DeploymentEvent>),
    ),
    tag = TAG
)]
pub async fn get_deployment_events(
    Path(deployment_id): Path<String>,
    Extension(state): Extension<State>,
) -> Json<Vec<DeploymentEvent>> {
    Json(state.store.events.query(&deployment_id))
}

#[utoipa::path(
    get,
    path = "/events/stream",
    responses(
        (status = StatusCode::OK, description = "Server-sent stream of public events"),
    ),
    tag = TAG
)]
pub async fn stream_events(
    Extension(state): Extension<State>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let receiver = state.public_events.lock().await.subscribe();
    let stream = BroadcastStream::new(receiver)
        .filter_map(|event| event.ok())
        .map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
