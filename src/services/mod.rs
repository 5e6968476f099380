use std::sync::Arc;

use actix_web::web;

mod insights;
mod navigation;
mod redirect;
mod short_link;

pub use insights::InsightsService;
pub use navigation::ScheduledNavigation;
pub use redirect::{RedirectResolver, RedirectState, ResolveFailure};
pub use short_link::{ShortLinkService, ShortLinkServiceTrait};

use crate::{config::Config, repositories::TieredLinkStore, telemetry::Telemetry, utils::Clock};

/// Services built once at startup and shared by every worker
#[derive(Clone)]
pub struct Services {
    pub short_links: web::Data<ShortLinkService<TieredLinkStore>>,
    pub redirects: web::Data<RedirectResolver<TieredLinkStore>>,
    pub insights: web::Data<InsightsService<TieredLinkStore>>,
    pub clock: web::Data<dyn Clock>,
    pub telemetry: web::Data<Telemetry>,
}

impl Services {
    pub fn new(
        store: Arc<TieredLinkStore>,
        clock: Arc<dyn Clock>,
        telemetry: Telemetry,
        config: &Config,
    ) -> Self {
        let short_links = ShortLinkService::new(
            store.clone(),
            clock.clone(),
            telemetry.clone(),
            config.links.clone(),
        );
        let redirects = RedirectResolver::new(store.clone(), clock.clone(), telemetry.clone());
        let insights = InsightsService::new(store);

        Self {
            short_links: web::Data::new(short_links),
            redirects: web::Data::new(redirects),
            insights: web::Data::new(insights),
            clock: web::Data::from(clock),
            telemetry: web::Data::new(telemetry),
        }
    }
}

/// Service Register
pub fn register(services: &Services, cfg: &mut web::ServiceConfig) {
    cfg.app_data(services.short_links.clone())
        .app_data(services.redirects.clone())
        .app_data(services.insights.clone())
        .app_data(services.clock.clone())
        .app_data(services.telemetry.clone());
}
