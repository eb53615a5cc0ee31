//! Stored document shapes.

pub mod user;
