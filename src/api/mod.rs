//! HTTP surface: routes, CORS, request logging and the server loop.

pub mod error;
pub mod handlers;

use std::io;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::service::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub service: ReportService,
}

impl AppState {
    pub fn debug(&self) -> bool {
        self.service.settings().debug
    }
}

/// Builds the application router around `service`.
pub fn router(service: ReportService) -> Router {
    let cors = cors_layer(&service.settings().allowed_origins);
    let state = AppState { service };

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/reports/generate", get(handlers::generate_report))
        .route(
            "/api/v1/reports/download/{filename}",
            get(handlers::download_report),
        )
        .route("/api/v1/reports/list", get(handlers::list_reports))
        .layer(middleware::from_fn(request_log))
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(service: ReportService) -> io::Result<()> {
    let addr = service.settings().bind_addr;
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Sales report API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutting down");
}

async fn request_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Allows the configured origins with credentials. A `*` entry mirrors the caller's origin,
/// since a literal wildcard cannot be combined with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
