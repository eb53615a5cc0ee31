//! Repository layer for data access.

pub mod entities;
mod in_memory;
mod mongo;
mod user_repository;

pub use in_memory::InMemoryUserRepository;
pub use mongo::MongoUserRepository;
pub use user_repository::{parse_user_id, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
