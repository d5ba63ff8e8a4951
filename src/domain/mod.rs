//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture principles.
//! It defines entities, repository interfaces, and the background tasks that
//! run next to the HTTP server.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`request_context`] - Request data captured for click enrichment
//! - [`click_event`] - Click job passed to the worker
//! - [`click_worker`] - Asynchronous click enrichment and recording
//! - [`expiry_sweeper`] - Periodic deactivation of expired links
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler resolves the token through [`crate::application::services::RedirectService`]
//! 2. A [`click_event::ClickJob`] is sent to the bounded channel
//! 3. [`click_worker::run_click_worker`] enriches the job and records the click
//! 4. Click data is persisted via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod expiry_sweeper;
pub mod repositories;
pub mod request_context;
