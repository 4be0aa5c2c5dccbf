use actix_web::{HttpResponse, Responder, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::ServerState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub uptime: u64,
    pub total_requests: u64,
    pub error_count: u64,
}

/// Liveness route
/// This route returns no content, the response status is enough.
#[get("/")]
pub async fn health_route(state: web::Data<ServerState>) -> impl Responder {
    state.record_request();
    HttpResponse::Ok()
}

/// Health route polled by healthpulse
#[get("/api/v1/health")]
pub async fn api_health_route(state: web::Data<ServerState>) -> impl Responder {
    let total_requests = state.record_request();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: VERSION,
        uptime: state.uptime_ms(),
        total_requests,
        error_count: state.error_count(),
    })
}

/// Unknown paths count towards the reported error total
pub async fn not_found(state: web::Data<ServerState>) -> impl Responder {
    state.record_request();
    state.record_error();
    HttpResponse::NotFound().finish()
}
