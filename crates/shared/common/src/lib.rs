//! Common utilities shared across the user-account crates.
//!
//! This crate provides:
//! - The error taxonomy every store layer returns
//! - HTTP error body mapping for the boundary layer
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
