//! Business logic services for the application layer.

pub mod analytics_service;
pub mod click_recorder;
pub mod code_generator;
pub mod link_service;
pub mod redirect_service;

pub use analytics_service::AnalyticsService;
pub use click_recorder::ClickRecorder;
pub use code_generator::{AliasError, AliasValidation, CodeGenerator};
pub use link_service::{CreateLink, LinkService};
pub use redirect_service::{RedirectOutcome, RedirectService};
