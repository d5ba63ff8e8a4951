//! Handlers for custom alias checks.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::aliases::{AliasCheckResponse, ReservedAliasesResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Reports whether an alias could be used for a new link.
///
/// # Endpoint
///
/// `GET /api/aliases/{alias}`
///
/// Always 200 for a well-formed request; rejection reasons are in the body:
///
/// ```json
/// { "alias": "admin", "valid": false, "error": "reserved",
///   "message": "This alias is reserved and cannot be used" }
/// ```
pub async fn alias_check_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Json<AliasCheckResponse>, AppError> {
    let validation = state.code_generator.validate_custom_alias(&alias).await?;

    Ok(Json(AliasCheckResponse::new(alias, validation)))
}

/// `GET /api/aliases/reserved`
pub async fn reserved_aliases_handler(
    State(state): State<AppState>,
) -> Json<ReservedAliasesResponse> {
    Json(ReservedAliasesResponse {
        reserved: state.code_generator.reserved_words(),
    })
}
