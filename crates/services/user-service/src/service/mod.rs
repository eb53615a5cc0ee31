//! Service layer - user store use cases.

mod user_service;

pub use user_service::{UserManager, UserStore};
