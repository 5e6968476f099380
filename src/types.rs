use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::errors::AppError;

// Result type returned by handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage_tiers: Vec<String>,
}

// Define an AppState struct to hold shared application state
pub struct AppState {
    pub start_time: Instant,
    pub version: String,
    pub storage_tiers: Vec<String>,
}
