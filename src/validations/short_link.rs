use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use url::Url;

use crate::config::LinkConfig;
use crate::errors::{RowError, RowErrorKind};
use crate::models::{LinkRowInput, ShortLink, ValidityInput};
use crate::utils::id_generator::generate_short_code;

pub const SHORTCODE_MIN_LEN: usize = 3;
pub const SHORTCODE_MAX_LEN: usize = 12;

/// Validates that a URL is present and parses as an absolute URL.
/// Returns the trimmed URL.
pub fn validate_url(url_str: &str) -> Result<String, RowErrorKind> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(RowErrorKind::MissingUrl);
    }

    // Url::parse rejects relative references, so success means absolute
    match Url::parse(trimmed) {
        Ok(_) => Ok(trimmed.to_string()),
        Err(_) => Err(RowErrorKind::InvalidUrlFormat),
    }
}

/// Parses the optional validity in minutes, falling back to `default_minutes`.
/// An empty string counts as omitted.
pub fn parse_validity(
    validity: Option<&ValidityInput>,
    default_minutes: u32,
) -> Result<i64, RowErrorKind> {
    let minutes = match validity {
        None => return Ok(i64::from(default_minutes)),
        Some(ValidityInput::Text(text)) if text.trim().is_empty() => {
            return Ok(i64::from(default_minutes))
        }
        Some(ValidityInput::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| RowErrorKind::InvalidValidity)?,
        Some(ValidityInput::Number(number)) => {
            number.as_i64().ok_or(RowErrorKind::InvalidValidity)?
        }
    };

    if minutes <= 0 {
        return Err(RowErrorKind::InvalidValidity);
    }

    Ok(minutes)
}

/// Validates that a custom shortcode is 3-12 ASCII alphanumeric characters
pub fn validate_shortcode_format(code: &str) -> Result<(), RowErrorKind> {
    let valid = code.chars().all(|c| c.is_ascii_alphanumeric())
        && (SHORTCODE_MIN_LEN..=SHORTCODE_MAX_LEN).contains(&code.len());

    if valid {
        Ok(())
    } else {
        Err(RowErrorKind::InvalidShortcodeFormat)
    }
}

/// Validates one row against the codes used so far and builds its link
fn validate_row(
    row: &LinkRowInput,
    used: &HashSet<String>,
    config: &LinkConfig,
    now: DateTime<Utc>,
) -> Result<ShortLink, RowErrorKind> {
    let original_url = validate_url(&row.url)?;
    let minutes = parse_validity(row.validity.as_ref(), config.default_validity_minutes)?;

    let validity = Duration::try_minutes(minutes).ok_or(RowErrorKind::InvalidValidity)?;
    if now.checked_add_signed(validity).is_none() {
        return Err(RowErrorKind::InvalidValidity);
    }

    let short_code = match row.shortcode.as_deref() {
        Some(code) if !code.is_empty() => {
            validate_shortcode_format(code)?;
            if used.contains(code) {
                return Err(RowErrorKind::ShortcodeCollision(code.to_string()));
            }
            code.to_string()
        }
        _ => generate_short_code(used, config.code_length, config.max_generation_attempts)?,
    };

    Ok(ShortLink::new(original_url, short_code, now, validity))
}

/// Validates a whole creation batch.
///
/// Rows are checked in order against `existing` plus the codes assigned to
/// earlier rows. Either every row yields a link or every row error is
/// returned; a failing row reserves no code.
pub fn validate_batch(
    rows: &[LinkRowInput],
    existing: &HashSet<String>,
    config: &LinkConfig,
    now: DateTime<Utc>,
) -> Result<Vec<ShortLink>, Vec<RowError>> {
    let mut used = existing.clone();
    let mut links = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match validate_row(row, &used, config, now) {
            Ok(link) => {
                used.insert(link.short_code.clone());
                links.push(link);
            }
            Err(kind) => {
                debug!("Row {} rejected: {}", idx + 1, kind);
                errors.push(RowError::new(idx + 1, kind));
            }
        }
    }

    if errors.is_empty() {
        Ok(links)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    fn codes(list: &[&str]) -> HashSet<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_validate_url() {
        // Valid URLs
        assert_eq!(validate_url("https://example.com").unwrap(), "https://example.com");
        assert_eq!(
            validate_url("  http://example.com/path?query=value ").unwrap(),
            "http://example.com/path?query=value"
        );

        // Invalid URLs
        assert_eq!(validate_url(""), Err(RowErrorKind::MissingUrl));
        assert_eq!(validate_url("   "), Err(RowErrorKind::MissingUrl));
        assert_eq!(validate_url("not-a-url"), Err(RowErrorKind::InvalidUrlFormat));
        assert_eq!(validate_url("/relative/path"), Err(RowErrorKind::InvalidUrlFormat));
    }

    #[test]
    fn test_parse_validity() {
        assert_eq!(parse_validity(None, 30), Ok(30));
        assert_eq!(parse_validity(Some(&"".into()), 30), Ok(30));
        assert_eq!(parse_validity(Some(&"1".into()), 30), Ok(1));
        assert_eq!(parse_validity(Some(&" 45 ".into()), 30), Ok(45));
        assert_eq!(parse_validity(Some(&120i64.into()), 30), Ok(120));

        assert_eq!(parse_validity(Some(&"0".into()), 30), Err(RowErrorKind::InvalidValidity));
        assert_eq!(parse_validity(Some(&"-5".into()), 30), Err(RowErrorKind::InvalidValidity));
        assert_eq!(parse_validity(Some(&"ten".into()), 30), Err(RowErrorKind::InvalidValidity));
        assert_eq!(parse_validity(Some(&"1.5".into()), 30), Err(RowErrorKind::InvalidValidity));

        let fractional = ValidityInput::Number(serde_json::Number::from_f64(2.5).unwrap());
        assert_eq!(parse_validity(Some(&fractional), 30), Err(RowErrorKind::InvalidValidity));
    }

    #[test]
    fn test_validate_shortcode_format() {
        // Valid shortcodes
        assert!(validate_shortcode_format("abc").is_ok());
        assert!(validate_shortcode_format("promo1").is_ok());
        assert!(validate_shortcode_format("ABCdef123456").is_ok());

        // Invalid shortcodes
        assert!(validate_shortcode_format("ab").is_err());
        assert!(validate_shortcode_format("abcdefghijklm").is_err());
        assert!(validate_shortcode_format("with-dash").is_err());
        assert!(validate_shortcode_format("spa ce").is_err());
        assert!(validate_shortcode_format("ünï").is_err());
    }

    #[test]
    fn test_batch_generates_missing_codes() {
        let existing = codes(&["taken1"]);
        let rows = vec![
            LinkRowInput::new("https://a.example"),
            LinkRowInput::new("https://b.example").with_shortcode(""),
            LinkRowInput::new("https://c.example").with_shortcode("custom"),
        ];

        let links = validate_batch(&rows, &existing, &LinkConfig::default(), now()).unwrap();

        assert_eq!(links.len(), 3);
        assert_eq!(links[2].short_code, "custom");
        let unique: HashSet<_> = links.iter().map(|l| l.short_code.clone()).collect();
        assert_eq!(unique.len(), 3);
        for link in &links[..2] {
            assert_eq!(link.short_code.len(), 6);
            assert!(!existing.contains(&link.short_code));
        }
    }

    #[test]
    fn test_batch_default_and_custom_validity() {
        let rows = vec![
            LinkRowInput::new("https://example.com"),
            LinkRowInput::new("https://example.com").with_validity("1"),
        ];

        let links = validate_batch(&rows, &HashSet::new(), &LinkConfig::default(), now()).unwrap();

        assert_eq!(links[0].created_at, now());
        assert_eq!(links[0].expiry - links[0].created_at, Duration::minutes(30));
        assert_eq!(links[1].expiry - links[1].created_at, Duration::seconds(60));
    }

    #[test]
    fn test_batch_flags_only_second_duplicate() {
        let rows = vec![
            LinkRowInput::new("https://a.example").with_shortcode("promo1"),
            LinkRowInput::new("https://b.example").with_shortcode("promo1"),
        ];

        let errors =
            validate_batch(&rows, &HashSet::new(), &LinkConfig::default(), now()).unwrap_err();

        assert_eq!(
            errors,
            vec![RowError::new(2, RowErrorKind::ShortcodeCollision("promo1".into()))]
        );
    }

    #[test]
    fn test_batch_collides_with_existing_codes() {
        let rows = vec![LinkRowInput::new("https://a.example").with_shortcode("promo1")];

        let errors =
            validate_batch(&rows, &codes(&["promo1"]), &LinkConfig::default(), now()).unwrap_err();

        assert_eq!(errors[0].kind, RowErrorKind::ShortcodeCollision("promo1".into()));
    }

    #[test]
    fn test_batch_reports_every_row_error_in_order() {
        let rows = vec![
            LinkRowInput::new(""),
            LinkRowInput::new("nope"),
            LinkRowInput::new("https://ok.example"),
            LinkRowInput::new("https://x.example").with_validity("0"),
            LinkRowInput::new("https://y.example").with_shortcode("x!"),
        ];

        let errors =
            validate_batch(&rows, &HashSet::new(), &LinkConfig::default(), now()).unwrap_err();

        let got: Vec<_> = errors.iter().map(|e| (e.row, e.kind.clone())).collect();
        assert_eq!(
            got,
            vec![
                (1, RowErrorKind::MissingUrl),
                (2, RowErrorKind::InvalidUrlFormat),
                (4, RowErrorKind::InvalidValidity),
                (5, RowErrorKind::InvalidShortcodeFormat),
            ]
        );
    }

    #[test]
    fn test_failed_row_reserves_no_code() {
        // first row fails on validity, so its shortcode stays free for row 2
        let rows = vec![
            LinkRowInput::new("https://a.example")
                .with_validity("abc")
                .with_shortcode("promo1"),
            LinkRowInput::new("https://b.example").with_shortcode("promo1"),
        ];

        let errors =
            validate_batch(&rows, &HashSet::new(), &LinkConfig::default(), now()).unwrap_err();

        assert_eq!(errors, vec![RowError::new(1, RowErrorKind::InvalidValidity)]);
    }

    #[test]
    fn test_huge_validity_is_rejected() {
        let rows = vec![LinkRowInput::new("https://a.example").with_validity(i64::MAX)];

        let errors =
            validate_batch(&rows, &HashSet::new(), &LinkConfig::default(), now()).unwrap_err();

        assert_eq!(errors[0].kind, RowErrorKind::InvalidValidity);
    }

    #[test]
    fn test_generation_exhaustion_surfaces_as_row_error() {
        let config = LinkConfig {
            max_generation_attempts: 0,
            ..LinkConfig::default()
        };
        let rows = vec![LinkRowInput::new("https://a.example")];

        let errors = validate_batch(&rows, &HashSet::new(), &config, now()).unwrap_err();

        assert_eq!(errors[0].kind, RowErrorKind::GenerationExhausted(0));
    }
}
