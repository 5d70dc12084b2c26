//! # Duel Development Tools
//!
//! Command-line tools for authoring battle data:
//! - Data validators
//! - Legacy skill catalog migration
//! - Distance/damage preview tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod migrate;
pub mod preview;
pub mod raw;
pub mod validate;

pub use error::{ToolError, ToolResult};
