use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::{Extension, middleware, routing::get};
use config::Config;
use event::PublicEvent;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::future::ready;
use std::sync::Arc;
use std::time::Instant;
use store::Store;
use tokio::net::TcpListener;
use tokio::sync::broadcast::Sender;
use tokio::sync::{Mutex, broadcast};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

pub mod config;
pub mod dashboard;
pub mod deployment;
pub mod error;
pub mod event;
pub mod promotion;
pub mod store;

#[derive(Clone, Debug)]
pub struct State {
    store: Arc<Store>,
    config: &'static Config,
    public_events: Arc<Mutex<Sender<PublicEvent>>>,
}

impl State {
    pub fn new(config: &'static Config) -> State {
        let (tx_message, _rx_message) = broadcast::channel::<PublicEvent>(16);
        State {
            store: Arc::new(Store::new()),
            config,
            public_events: Arc::new(Mutex::new(tx_message)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(info(description = "Release rollout tracking API"))]
struct ApiDoc;

/// Builds the full application router around `state`. The server and the
/// integration tests go through the same construction.
pub fn router(state: State) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(dashboard::api))
        .routes(routes!(
            deployment::route::get_deployments,
            deployment::route::create_deployment
        ))
        .routes(routes!(deployment::route::get_current_deployment))
        .routes(routes!(deployment::route::get_deployment_by_id))
        .routes(routes!(deployment::route::request_approval))
        .routes(routes!(event::route::ingest_event))
        .routes(routes!(event::route::get_deployment_events))
        .routes(routes!(event::route::stream_events))
        .routes(routes!(promotion::route::get_promotion_target))
        .routes(routes!(promotion::route::request_promotion))
        .routes(routes!(promotion::route::get_version_history))
        .routes(routes!(promotion::route::get_environments))
        .split_for_parts();

    let json_specification = api.to_pretty_json().expect("API docs generation failed");

    router
        .route("/health", get(health))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(Extension(state))
        .route(
            "/docs/openapi.json",
            get(move || ready(json_specification.clone())),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .merge(Scalar::with_url("/docs", api))
}

pub async fn start_main_server(config: &'static Config) {
    info!("Starting Slipway API v{}", env!("CARGO_PKG_VERSION"));

    let state = State::new(config);

    let recorder_handle = setup_metrics_recorder();
    let app = router(state).route("/metrics", get(move || ready(recorder_handle.render())));

    let listener = TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("error: failed to bind to port");
    info!(
        "Slipway API running on http://{} (Press Ctrl+C to quit)",
        listener.local_addr().unwrap().to_string()
    );
    axum::serve(listener, app)
        .await
        .expect("error: failed to initialize axum server");
}

async fn health() -> StatusCode {
    StatusCode::OK
}

fn setup_metrics_recorder() -> PrometheusHandle {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_requests_duration_seconds".to_string()),
            EXPONENTIAL_SECONDS,
        )
        .expect("error: failed to build prometheus recorder")
        .install_recorder()
        .expect("error: failed to install prometheus recorder")
}

async fn track_metrics(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::increment_counter!("http_requests_total", &labels);
    metrics::histogram!("http_requests_duration_seconds", latency, &labels);

    response
}
