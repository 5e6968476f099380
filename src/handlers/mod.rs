mod short_link;

pub use short_link::{
    create_handler, insight_by_code_handler, insights_handler, list_handler, redirect_handler,
    InsightsServiceType, RedirectResolverType, ShortLinkServiceType,
};
