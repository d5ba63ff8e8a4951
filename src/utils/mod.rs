//! Utility functions for code generation and URL processing.
//!
//! - [`code_generator`] - Random short codes and token format checks
//! - [`url_normalizer`] - Destination URL validation and normalization

pub mod code_generator;
pub mod url_normalizer;
