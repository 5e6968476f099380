use std::time::Duration;

use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};
use serde_json::json;
use tokio::sync::oneshot;

use crate::{
    config::Config,
    errors::AppError,
    models::{CreateLinksRequest, LinkInsightDto, ShortLinkResponseDto, MAX_ROWS},
    repositories::TieredLinkStore,
    services::{
        InsightsService, RedirectResolver, RedirectState, ResolveFailure, ScheduledNavigation,
        ShortLinkService, ShortLinkServiceTrait,
    },
    telemetry::Telemetry,
    types::Result,
    utils::Clock,
};

pub type ShortLinkServiceType = ShortLinkService<TieredLinkStore>;
pub type RedirectResolverType = RedirectResolver<TieredLinkStore>;
pub type InsightsServiceType = InsightsService<TieredLinkStore>;

/// Origin short URLs are built under: the configured public base URL, or
/// the scheme and host the request came in on
pub fn request_origin(req: &HttpRequest, config: &Config) -> String {
    match &config.app.public_base_url {
        Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
        _ => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    }
}

/// List links route handler
pub async fn list_handler(
    req: HttpRequest,
    service: web::Data<ShortLinkServiceType>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let origin = request_origin(&req, &config);
    let now = clock.now();

    let links: Vec<ShortLinkResponseDto> = service
        .list()
        .await?
        .into_iter()
        .map(|link| ShortLinkResponseDto::from_link(link, &origin, now))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "data": links,
        "max_rows": MAX_ROWS,
        "default_validity_minutes": service.config().default_validity_minutes,
    })))
}

/// Create short links route handler
pub async fn create_handler(
    req: HttpRequest,
    dto: web::Json<CreateLinksRequest>,
    service: web::Data<ShortLinkServiceType>,
    clock: web::Data<dyn Clock>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let dto = dto.into_inner();
    telemetry.info("page", format!("Form submitted with {} row(s)", dto.rows.len()));

    let created = service.create_batch(dto).await?;

    let origin = request_origin(&req, &config);
    let now = clock.now();
    let links: Vec<ShortLinkResponseDto> = created
        .into_iter()
        .map(|link| ShortLinkResponseDto::from_link(link, &origin, now))
        .collect();

    Ok(HttpResponse::Created().json(json!({
        "data": links,
        "message": "Short URLs created successfully!",
    })))
}

/// All insights route handler
pub async fn insights_handler(
    req: HttpRequest,
    service: web::Data<InsightsServiceType>,
    clock: web::Data<dyn Clock>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    telemetry.info("page", "Insights page loaded");

    let origin = request_origin(&req, &config);
    let now = clock.now();
    let insights: Vec<LinkInsightDto> = service
        .collect()
        .await?
        .into_iter()
        .map(|insight| LinkInsightDto::from_insight(insight, &origin, now))
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "data": insights })))
}

/// Single link insight route handler
pub async fn insight_by_code_handler(
    req: HttpRequest,
    code: web::Path<String>,
    service: web::Data<InsightsServiceType>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let code = code.into_inner();
    let insight = service
        .for_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Short URL '{}' not found", code)))?;

    let origin = request_origin(&req, &config);
    Ok(HttpResponse::Ok().json(json!({
        "data": LinkInsightDto::from_insight(insight, &origin, clock.now()),
    })))
}

/// Redirect route handler
pub async fn redirect_handler(
    path: web::Path<String>,
    resolver: web::Data<RedirectResolverType>,
    telemetry: web::Data<Telemetry>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let short_code = path.into_inner();

    let target = match resolver.resolve(&short_code).await? {
        RedirectState::Success(url) => url,
        RedirectState::Expired => {
            return Err(AppError::Gone(format!(
                "Short URL '{}' has expired",
                short_code.trim()
            )))
        }
        RedirectState::Error(failure @ ResolveFailure::NoCodeProvided) => {
            return Err(AppError::Validation(failure.to_string()))
        }
        RedirectState::Error(failure @ ResolveFailure::CodeNotFound) => {
            return Err(AppError::NotFound(failure.to_string()))
        }
        RedirectState::Loading => {
            return Err(AppError::Internal("Redirect did not settle".to_string()))
        }
    };

    // Dropping this future (client gone) drops the navigation and aborts it
    let (tx, rx) = oneshot::channel();
    let delay = Duration::from_millis(config.redirect.delay_ms);
    let _navigation = ScheduledNavigation::schedule(delay, target, move |url| {
        let _ = tx.send(url);
    });
    debug!("Navigation scheduled in {:?}", delay);

    let location = rx
        .await
        .map_err(|_| AppError::Internal("Navigation was cancelled".to_string()))?;

    info!("Redirecting to '{}'", location);
    telemetry.info("handler", format!("Redirecting to {}", location));

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, location))
        .finish())
}
