//! Per-client rate limiting for the management API.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::error::AppError;

pub type ApiRateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a token bucket limiter keyed by client IP.
///
/// The key comes from `X-Forwarded-For`, `X-Real-IP` or `Forwarded` when
/// present, otherwise from the peer address. Requests exceeding the limit
/// receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = api::routes::api_routes()
///     .layer(rate_limit::layer(2, 100)?);
/// ```
///
/// # Errors
///
/// Returns an error if `per_second` or `burst` is zero.
pub fn layer(per_second: u64, burst: u32) -> Result<ApiRateLimitLayer, AppError> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(per_second)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| {
            AppError::internal(
                "Invalid rate limit configuration",
                serde_json::json!({ "per_second": per_second, "burst": burst }),
            )
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
