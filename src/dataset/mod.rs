//! Loading candidate tables from delimited text.
//!
//! Sources are discovered by [`source::SourceScanner`], parsed by
//! [`loader`], and merged into a single [`crate::models::Dataset`].

pub mod error;
pub mod loader;
pub mod source;

pub use loader::*;
