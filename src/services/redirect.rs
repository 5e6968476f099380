// src/services/redirect.rs - Shortcode resolution
use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::errors::StoreError;
use crate::models::ClickEvent;
use crate::repositories::LinkStore;
use crate::telemetry::Telemetry;
use crate::utils::Clock;

/// Why a resolution ended in the error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveFailure {
    NoCodeProvided,
    CodeNotFound,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveFailure::NoCodeProvided => write!(f, "No shortcode provided in the URL."),
            ResolveFailure::CodeNotFound => write!(f, "Short URL not found."),
        }
    }
}

/// Redirect page state. `Loading` is the only non-terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RedirectState {
    #[default]
    Loading,
    Error(ResolveFailure),
    Expired,
    Success(String),
}

impl RedirectState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedirectState::Loading)
    }
}

pub struct RedirectResolver<T: LinkStore> {
    store: Arc<T>,
    clock: Arc<dyn Clock>,
    telemetry: Telemetry,
}

impl<T: LinkStore> RedirectResolver<T> {
    pub fn new(store: Arc<T>, clock: Arc<dyn Clock>, telemetry: Telemetry) -> Self {
        Self {
            store,
            clock,
            telemetry,
        }
    }

    /// Moves a visit of `/<code>` from `Loading` to its terminal state.
    ///
    /// Only `Success` writes: exactly one click event per successful call.
    ///
    /// ### Errors
    /// * `StoreError` - If the click event cannot be recorded
    pub async fn resolve(&self, code: &str) -> Result<RedirectState, StoreError> {
        debug!("Redirect requested for code: {}", code);
        self.telemetry
            .info("page", format!("ShortlinkRedirect page loaded for code: {}", code));

        let code = code.trim();
        if code.is_empty() {
            self.telemetry
                .error("resolver", ResolveFailure::NoCodeProvided.to_string());
            return Ok(RedirectState::Error(ResolveFailure::NoCodeProvided));
        }

        let links = self.store.list_all().await?;
        let Some(link) = links.into_iter().find(|l| l.short_code == code) else {
            info!("Shortcode not found: {}", code);
            self.telemetry
                .error("resolver", format!("Shortcode not found: {}", code));
            return Ok(RedirectState::Error(ResolveFailure::CodeNotFound));
        };

        let now = self.clock.now();
        if link.is_expired_at(now) {
            info!("Shortcode expired: {}", code);
            self.telemetry
                .info("resolver", format!("Shortcode expired: {}", code));
            return Ok(RedirectState::Expired);
        }

        self.store
            .append_click(&ClickEvent::direct(code, now))
            .await?;
        self.telemetry
            .info("resolver", format!("Click tracked for shortcode: {}", code));

        info!("Redirecting '{}' to '{}'", code, link.original_url);
        Ok(RedirectState::Success(link.original_url))
    }
}
