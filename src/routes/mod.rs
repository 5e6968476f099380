use actix_web::{web, HttpResponse, Responder};

use crate::{
    errors::AppError,
    types::{AppState, HealthStatus},
};

mod short_link;

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    // Calculate uptime in seconds
    let uptime = data.start_time.elapsed().as_secs();

    let status = HealthStatus {
        status: String::from("OK"),
        version: data.version.clone(),
        uptime_seconds: uptime,
        storage_tiers: data.storage_tiers.clone(),
    };

    // Return the status as JSON
    HttpResponse::Ok().json(status)
}

// Anything the router cannot place, e.g. nested paths
async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // /health must be registered before the short link catch-all
    cfg.route("/health", web::get().to(health_check));
    short_link::configure_routes(cfg);
    cfg.default_service(web::to(not_found));
}
