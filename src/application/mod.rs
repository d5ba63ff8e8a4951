//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services hold repository trait objects and
//! provide a clean API for HTTP handlers, the click worker and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::CodeGenerator`] - Short code generation and alias validation
//! - [`services::LinkService`] - Link creation and management
//! - [`services::RedirectService`] - Token resolution and click dispatch
//! - [`services::ClickRecorder`] - Click persistence
//! - [`services::AnalyticsService`] - Click aggregations and reports

pub mod services;
