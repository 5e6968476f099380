use actix_web::{web, HttpRequest, Responder};

use crate::{
    config::Config,
    handlers::{
        create_handler, insight_by_code_handler, insights_handler, list_handler, redirect_handler,
        InsightsServiceType, RedirectResolverType, ShortLinkServiceType,
    },
    models::CreateLinksRequest,
    telemetry::Telemetry,
    types::Result,
    utils::Clock,
};

// List short links route handler
async fn list_links(
    req: HttpRequest,
    service: web::Data<ShortLinkServiceType>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    list_handler(req, service, clock, config).await
}

// Create short links route handler
async fn create_links(
    req: HttpRequest,
    dto: web::Json<CreateLinksRequest>,
    service: web::Data<ShortLinkServiceType>,
    clock: web::Data<dyn Clock>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    create_handler(req, dto, service, clock, telemetry, config).await
}

// All insights route handler
async fn get_insights(
    req: HttpRequest,
    service: web::Data<InsightsServiceType>,
    clock: web::Data<dyn Clock>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    insights_handler(req, service, clock, telemetry, config).await
}

// Single insight route handler
async fn get_insight_by_code(
    req: HttpRequest,
    code: web::Path<String>,
    service: web::Data<InsightsServiceType>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    insight_by_code_handler(req, code, service, clock, config).await
}

// Redirect route handler
async fn redirect(
    code: web::Path<String>,
    resolver: web::Data<RedirectResolverType>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    redirect_handler(code, resolver, telemetry, config).await
}

// Named routes first; the single-segment catch-all must stay last
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_links))
        .route("/", web::post().to(create_links))
        .route("/insights", web::get().to(get_insights))
        .route("/insights/{code}", web::get().to(get_insight_by_code))
        .route("/{code}", web::get().to(redirect));
}
