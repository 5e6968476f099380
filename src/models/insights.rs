use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClickEvent, ShortLink, ShortLinkResponseDto};

/// Click history of one short link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInsight {
    pub link: ShortLink,
    pub clicks: Vec<ClickEvent>,
}

impl LinkInsight {
    pub fn total_clicks(&self) -> usize {
        self.clicks.len()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponseDto {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
}

impl From<ClickEvent> for ClickResponseDto {
    fn from(event: ClickEvent) -> Self {
        ClickResponseDto {
            timestamp: event.timestamp,
            source: event.source,
            location: event.location,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkInsightDto {
    #[serde(flatten)]
    pub link: ShortLinkResponseDto,
    pub total_clicks: usize,
    pub clicks: Vec<ClickResponseDto>,
}

impl LinkInsightDto {
    pub fn from_insight(insight: LinkInsight, origin: &str, now: DateTime<Utc>) -> Self {
        LinkInsightDto {
            total_clicks: insight.total_clicks(),
            link: ShortLinkResponseDto::from_link(insight.link, origin, now),
            clicks: insight.clicks.into_iter().map(ClickResponseDto::from).collect(),
        }
    }
}
