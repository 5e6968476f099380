mod insights;
mod short_link;

pub use insights::{ClickResponseDto, LinkInsight, LinkInsightDto};
pub use short_link::{
    ClickEvent, CreateLinksRequest, LinkRowInput, ShortLink, ShortLinkResponseDto, ValidityInput,
    CLICK_LOCATION_UNKNOWN, CLICK_SOURCE_DIRECT, MAX_ROWS,
};
