//! Collision-aware short code generation and custom alias validation.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::CodeGeneratorConfig;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{is_token_charset, is_valid_alias_length, random_code};

/// Random draws per length before moving on to a longer code.
const ATTEMPTS_PER_LENGTH: usize = 10;

/// Why a custom alias was rejected. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasError {
    Length,
    Format,
    Reserved,
    Taken,
}

impl AliasError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Format => "format",
            Self::Reserved => "reserved",
            Self::Taken => "taken",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Length => "Custom alias must be between 3 and 50 characters",
            Self::Format => "Custom alias can only contain letters, numbers, and hyphens",
            Self::Reserved => "This alias is reserved and cannot be used",
            Self::Taken => "This alias is already taken",
        }
    }

    /// Maps the rejection onto the error returned by link creation.
    pub fn into_app_error(self, alias: &str) -> AppError {
        let details = json!({ "field": "custom_alias", "alias": alias, "reason": self.as_str() });
        match self {
            Self::Taken => AppError::conflict(self.message(), details),
            _ => AppError::bad_request(self.message(), details),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AliasValidation {
    pub valid: bool,
    pub error: Option<AliasError>,
}

impl AliasValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: AliasError) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }
}

/// Produces short codes unique across the code/alias namespace.
///
/// The existence check here is advisory: another request may claim the same
/// token between the check and the insert. The store's uniqueness constraint
/// is what finally decides, and [`crate::application::services::LinkService`]
/// regenerates on a short code conflict.
pub struct CodeGenerator {
    config: CodeGeneratorConfig,
    links: Arc<dyn LinkRepository>,
}

impl CodeGenerator {
    pub fn new(config: CodeGeneratorConfig, links: Arc<dyn LinkRepository>) -> Self {
        Self { config, links }
    }

    /// Generates a code of the configured default length.
    pub async fn generate(&self) -> Result<String, AppError> {
        self.generate_with_length(self.config.default_length).await
    }

    /// Generates an unused code, starting at `length` characters.
    ///
    /// After [`ATTEMPTS_PER_LENGTH`] collisions the length grows by one, up to
    /// the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when every length up to the maximum
    /// was exhausted. Store errors are propagated unchanged.
    pub async fn generate_with_length(&self, length: usize) -> Result<String, AppError> {
        let length = length.max(1);
        let max_length = self.config.max_length.max(length);

        for len in length..=max_length {
            for _ in 0..ATTEMPTS_PER_LENGTH {
                let code = random_code(len);
                if !self.links.exists_by_code_or_alias(&code).await? {
                    debug!(code = %code, "Generated short code");
                    return Ok(code);
                }
            }

            warn!(
                length = len,
                attempts = ATTEMPTS_PER_LENGTH,
                "Short code collisions exhausted length, escalating"
            );
        }

        Err(AppError::unavailable(
            "Short code space exhausted",
            json!({ "start_length": length, "max_length": max_length }),
        ))
    }

    /// Checks a user-chosen alias.
    ///
    /// Checks run in order (length, format, reserved word, already taken) and
    /// the first failure is returned. The store is only consulted once the
    /// local checks pass.
    pub async fn validate_custom_alias(&self, alias: &str) -> Result<AliasValidation, AppError> {
        if !is_valid_alias_length(alias) {
            return Ok(AliasValidation::rejected(AliasError::Length));
        }

        if !is_token_charset(alias) {
            return Ok(AliasValidation::rejected(AliasError::Format));
        }

        if self.config.is_reserved(alias) {
            return Ok(AliasValidation::rejected(AliasError::Reserved));
        }

        if self.links.exists_by_code_or_alias(alias).await? {
            return Ok(AliasValidation::rejected(AliasError::Taken));
        }

        Ok(AliasValidation::ok())
    }

    pub fn reserved_words(&self) -> Vec<String> {
        self.config.reserved_list()
    }
}
