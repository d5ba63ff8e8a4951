//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Links and the shared code/alias namespace
//! - [`ClickRepository`] - Click recording and analytics aggregation

pub mod click_repository;
pub mod link_repository;

pub use click_repository::{ClickRepository, ClickTotals, DailyReport, DateCount, LabelCount};
pub use link_repository::{LinkRepository, LinkWithClicks};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
