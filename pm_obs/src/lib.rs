//! ABOUTME: Load metrics registry and the observability HTTP server
//! ABOUTME: Serves /metrics, /healthz and /readyz for scrapers and orchestrators

use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::Logger,
    web, App, HttpResponse, HttpServer,
};
use pm_core::{Error, Result};
use serde_json::json;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub mod metrics;

pub use metrics::Metrics;

/// Content type of the Prometheus text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Readiness gate flipped once the load driver has initialized the table
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: Arc<AtomicBool>,
}

impl ReadinessGate {
    /// Create a gate that starts out not ready
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

/// Shared state handed to every request
#[derive(Debug, Clone)]
pub struct ObsState {
    pub readiness: ReadinessGate,
    pub metrics: Arc<Metrics>,
}

impl ObsState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            readiness: ReadinessGate::new(),
            metrics,
        }
    }
}

fn status_body(code: StatusCode, status: &str) -> HttpResponse {
    HttpResponse::build(code).json(json!({ "status": status }))
}

async fn healthz() -> HttpResponse {
    status_body(StatusCode::OK, "ok")
}

/// 503 until the load table has been created and truncated
async fn readyz(state: web::Data<ObsState>) -> HttpResponse {
    if state.readiness.is_ready() {
        status_body(StatusCode::OK, "ready")
    } else {
        tracing::debug!("Readiness requested before load table initialization");
        status_body(StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

async fn scrape(state: web::Data<ObsState>) -> HttpResponse {
    match state.metrics.encode() {
        Ok(body) => {
            tracing::trace!(bytes = body.len(), "Serving metrics scrape");
            HttpResponse::Ok()
                .content_type(METRICS_CONTENT_TYPE)
                .body(body)
        }
        Err(e) => {
            tracing::error!(error = %e, "Metrics scrape failed");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

/// Register the observability routes on an actix service config
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(healthz))
        .route("/readyz", web::get().to(readyz))
        .route("/metrics", web::get().to(scrape));
}

/// Build the observability app around shared state
pub fn create_service(
    state: ObsState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Logger::new("%r %s %b %Dms"))
        .configure(configure)
}

/// Serve the observability app until the process stops
///
/// A bind failure is returned immediately so the caller can exit.
pub async fn start_server(bind_addr: &str, state: ObsState) -> Result<()> {
    let server = HttpServer::new(move || create_service(state.clone()))
        .bind(bind_addr)
        .map_err(|e| Error::Server(format!("Failed to bind {}: {}", bind_addr, e)))?;

    tracing::info!(addrs = ?server.addrs(), "Metrics server listening");

    server
        .run()
        .await
        .map_err(|e| Error::Server(format!("Metrics server stopped: {}", e)))
}
