//! Short code generation and alias format checks.
//!
//! Pure helpers without store access. Collision handling and reserved-word
//! checks live in [`crate::application::services::CodeGenerator`].

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Characters a generated short code is drawn from.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const ALIAS_MIN_LENGTH: usize = 3;
pub const ALIAS_MAX_LENGTH: usize = 50;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("token pattern is valid"));

/// Generates a code of `length` characters, each drawn uniformly from [`ALPHABET`].
///
/// # Examples
///
/// ```ignore
/// let code = random_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// True if `token` only uses characters allowed in codes and aliases:
/// ASCII letters, digits and hyphens.
pub fn is_token_charset(token: &str) -> bool {
    TOKEN_REGEX.is_match(token)
}

/// True if the alias length (in characters) is within the allowed range.
pub fn is_valid_alias_length(alias: &str) -> bool {
    (ALIAS_MIN_LENGTH..=ALIAS_MAX_LENGTH).contains(&alias.chars().count())
}
