//! DTOs for custom alias endpoints.

use serde::Serialize;

use crate::application::services::{AliasError, AliasValidation};

/// Response for `GET /api/aliases/{alias}`.
#[derive(Debug, Serialize)]
pub struct AliasCheckResponse {
    pub alias: String,
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AliasError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AliasCheckResponse {
    pub fn new(alias: String, validation: AliasValidation) -> Self {
        Self {
            alias,
            valid: validation.valid,
            error: validation.error,
            message: validation.error.map(|e| e.message().to_string()),
        }
    }
}

/// Response for `GET /api/aliases/reserved`.
#[derive(Debug, Serialize)]
pub struct ReservedAliasesResponse {
    pub reserved: Vec<String>,
}
