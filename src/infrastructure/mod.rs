//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain and enrichment
//! layers, providing concrete implementations for data persistence and
//! geolocation.
//!
//! # Modules
//!
//! - [`geoip`] - Geolocation sources (HTTP service and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod geoip;
pub mod persistence;
