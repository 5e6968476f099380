// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Most rows accepted in one creation batch
pub const MAX_ROWS: usize = 5;

pub const CLICK_SOURCE_DIRECT: &str = "direct";
pub const CLICK_LOCATION_UNKNOWN: &str = "Unknown";

/// A shortcode mapped to its original URL.
///
/// Serialized with camelCase keys, matching the persisted `shortUrls` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    /// The original, long URL that was shortened
    pub original_url: String,

    /// The custom or generated code that identifies this link
    pub short_code: String,

    /// When this link stops resolving
    pub expiry: DateTime<Utc>,

    /// When this link was created
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    pub fn new(
        original_url: impl Into<String>,
        short_code: impl Into<String>,
        created_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            short_code: short_code.into(),
            expiry: created_at + validity,
            created_at,
        }
    }

    /// Checks if the link has expired at `now`. The expiry instant itself
    /// still resolves.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }

    /// Fully-qualified short URL under `origin`
    pub fn short_url(&self, origin: &str) -> String {
        format!("{}/{}", origin.trim_end_matches('/'), self.short_code)
    }
}

/// One successful resolution of a shortcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
}

impl ClickEvent {
    /// Click from following the short URL directly
    pub fn direct(short_code: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            short_code: short_code.into(),
            timestamp,
            source: CLICK_SOURCE_DIRECT.to_string(),
            location: CLICK_LOCATION_UNKNOWN.to_string(),
        }
    }
}

/// Validity as submitted: forms send strings, API clients send numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidityInput {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for ValidityInput {
    fn from(value: &str) -> Self {
        ValidityInput::Text(value.to_string())
    }
}

impl From<i64> for ValidityInput {
    fn from(value: i64) -> Self {
        ValidityInput::Number(value.into())
    }
}

/// One row of the creation form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRowInput {
    #[serde(default)]
    pub url: String,

    /// Minutes the link stays valid, defaults to 30
    #[serde(default)]
    pub validity: Option<ValidityInput>,

    /// Custom shortcode, generated when omitted or empty
    #[serde(default)]
    pub shortcode: Option<String>,
}

impl LinkRowInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_validity(mut self, validity: impl Into<ValidityInput>) -> Self {
        self.validity = Some(validity.into());
        self
    }

    pub fn with_shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.shortcode = Some(shortcode.into());
        self
    }
}

// DTO for creating a batch of short links
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLinksRequest {
    #[validate(length(min = 1, max = 5, message = "Submit between 1 and 5 URLs at a time"))]
    pub rows: Vec<LinkRowInput>,
}

// DTO for response with short link details
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponseDto {
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub expired: bool,
}

impl ShortLinkResponseDto {
    pub fn from_link(link: ShortLink, origin: &str, now: DateTime<Utc>) -> Self {
        ShortLinkResponseDto {
            short_url: link.short_url(origin),
            expired: link.is_expired_at(now),
            short_code: link.short_code,
            original_url: link.original_url,
            created_at: link.created_at,
            expiry: link.expiry,
        }
    }
}
