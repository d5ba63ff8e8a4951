//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures with only the small amount of logic that
//! belongs to the data itself (e.g. link accessibility).
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping
//! - [`Click`] - One accepted redirect with its analytics fields
//!
//! # Design Pattern
//!
//! Separate structs are used for creation and partial updates:
//! - `NewLink`, `NewClick` - For creating new records
//! - `LinkPatch` - For partial updates

pub mod click;
pub mod link;

pub use click::{Click, DeviceType, NewClick};
pub use link::{Link, LinkAccess, LinkPatch, NewLink};
