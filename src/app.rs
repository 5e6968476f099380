use std::{sync::Arc, time::Instant};

use actix_cors::Cors;
use actix_web::{
    middleware::Logger,
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info, warn};

use crate::{
    config::{Config, Environment},
    errors::AppError,
    middleware::RequestLogger,
    repositories::{build_backends, TieredLinkStore},
    routes,
    services::{self, Services},
    telemetry::Telemetry,
    types::AppState,
    utils::SystemClock,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    // Configure log level based on environment and config
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

pub async fn server() -> AppResult<()> {
    // Load application configuration
    let config = Config::load()?;

    // Setup enhanced logging based on configuration
    setup_logging(&config)?;

    // Capture start time for uptime calculation
    let start_time = Instant::now();

    // Log startup information
    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    // Storage tiers, shared by every worker
    let backends = build_backends(&config.storage)
        .await
        .map_err(|e| AppError::Config(format!("Failed to open storage: {}", e)))?;
    let store = Arc::new(TieredLinkStore::new(backends));
    let storage_tiers: Vec<String> = store
        .tier_names()
        .into_iter()
        .map(String::from)
        .collect();
    info!("Storage tiers: {}", storage_tiers.join(" -> "));

    // Remote log sink; a failed send is only ever logged locally
    let telemetry = Telemetry::from_config(&config.log_sink)
        .map_err(|e| AppError::Logger(format!("Failed to build remote log sink: {}", e)))?
        .with_failure_observer(|e| warn!("Remote log sink failed: {}", e));

    let services = Services::new(store, Arc::new(SystemClock), telemetry.clone(), &config);

    // Determine if we should enable more verbose logging
    let enable_debug_logging = config.app.environment != Environment::Production;

    // Create a cloned config for the closure
    let app_config = config.clone();

    // Determine log format based on environment
    let log_format = if enable_debug_logging {
        // Simple format for development/testing
        "%a \"%r\" %s %b %T"
    } else {
        // Detailed format for production
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}i"
    };

    // Start the HTTP server
    HttpServer::new(move || {
        let bundle = services.clone();

        App::new()
            .app_data(web::Data::new(AppState {
                start_time,
                version: app_config.app.version.clone(),
                storage_tiers: storage_tiers.clone(),
            }))
            // Make the full configuration available to handlers
            .app_data(web::Data::new(app_config.clone()))
            .configure(move |cfg| services::register(&bundle, cfg))
            .wrap(Logger::new(log_format))
            // Outside the access logger so %{X-Request-ID}i is already set
            .wrap(RequestLogger::new(enable_debug_logging, telemetry.clone()))
            .wrap(Cors::permissive())
            // Configure routes
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
