//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - Account storage and credential lookup
//! - **PgGroupRepository** - Groups and their durable membership rows
//! - **PgMessageRepository** - Group message inserts and history
//! - **PgDirectMessageRepository** - One-to-one messages and conversations
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgGroupRepository, PgMessageRepository};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let group_repo = PgGroupRepository::new(pool.clone());
//!     let message_repo = PgMessageRepository::new(pool);
//! }
//! ```

pub mod direct_message_repository;
pub mod group_repository;
pub mod message_repository;
pub mod user_repository;

pub use direct_message_repository::PgDirectMessageRepository;
pub use group_repository::PgGroupRepository;
pub use message_repository::PgMessageRepository;
pub use user_repository::PgUserRepository;
