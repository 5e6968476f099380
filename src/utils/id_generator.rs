use std::collections::HashSet;

use rand::{rng, Rng};

use crate::errors::RowErrorKind;

/// Alphabet for generated shortcodes (0-9, A-Z, a-z)
const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Generates a random base62 character
fn random_base62_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    let idx = rng.random_range(0..CHARSET.len());
    CHARSET[idx] as char
}

/// Generates a random short ID of `length` base62 characters
pub fn generate_short_id(length: usize) -> String {
    let mut rng = rng();
    (0..length).map(|_| random_base62_char(&mut rng)).collect()
}

/// Generates a short code that is not a member of `existing`.
///
/// The whole code is resampled on collision. After `max_attempts` draws
/// that all collide the generator gives up with `GenerationExhausted`.
pub fn generate_short_code(
    existing: &HashSet<String>,
    length: usize,
    max_attempts: u32,
) -> Result<String, RowErrorKind> {
    for _ in 0..max_attempts {
        let code = generate_short_id(length);
        if !existing.contains(&code) {
            return Ok(code);
        }
        log::debug!("Generated short code '{}' collides, retrying", code);
    }

    Err(RowErrorKind::GenerationExhausted(max_attempts))
}
