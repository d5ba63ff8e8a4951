//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod aliases;
pub mod analytics;
pub mod health;
pub mod links;
pub mod redirect;

pub use aliases::{alias_check_handler, reserved_aliases_handler};
pub use analytics::{analytics_handler, chart_data_handler, recent_clicks_handler};
pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    update_link_handler,
};
pub use redirect::{preview_handler, redirect_handler};
