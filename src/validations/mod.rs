mod short_link;

pub use short_link::{
    parse_validity, validate_batch, validate_shortcode_format, validate_url, SHORTCODE_MAX_LEN,
    SHORTCODE_MIN_LEN,
};
