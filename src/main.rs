use std::process;

use log::{error, LevelFilter};

mod app;
mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod telemetry;
mod types;
mod utils;
mod validations;

use errors::AppError;

/// Exit status for failures the process cannot recover from
fn exit_code(err: &AppError) -> Option<i32> {
    match err {
        AppError::Server(_) => Some(1),
        AppError::Config(_) => Some(2),
        AppError::Logger(_) => Some(3),
        _ => None,
    }
}

#[actix_web::main]
async fn main() {
    // Run the server with error handling for critical failures
    if let Err(err) = app::server().await {
        // Config and logger failures happen before env_logger is installed
        if log::max_level() == LevelFilter::Off {
            eprintln!("quicklink: {}", err);
        }

        match exit_code(&err) {
            Some(code) => {
                error!("Critical failure: {}", err);
                process::exit(code);
            }
            // Log unexpected errors, but don't exit
            None => error!("Unexpected error: {}", err),
        }
    }
}
