//! Domain layer - Core user entities, validation rules and password hashing.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Nothing here performs I/O; the store crates build on these types.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult, FieldViolation};
pub use password::{Argon2Hasher, HashCost, PasswordHasher};
#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordHasher;
pub use user::{CreateUserParams, NewUser, UpdateUserParams, User, UserChanges, UserResponse};
pub use validation::{validate_create, validate_update};
