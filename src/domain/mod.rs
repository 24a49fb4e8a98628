//! # Domain Layer
//!
//! Core business types of the student network, independent of any
//! framework or storage concern.
//!
//! - **entities**: Users, groups, memberships and group messages, plus the
//!   repository traits that define their data access contracts
//! - **services**: Contracts such as room fan-out that the application layer
//!   drives and the presentation layer fulfils

pub mod entities;
pub mod services;

pub use entities::*;
pub use services::*;
