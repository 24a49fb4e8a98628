//! # Domain Entities
//!
//! Core domain entities. All entities map directly to their corresponding
//! database tables.
//!
//! - **User**: Student account with authentication data
//! - **Group**: A named study group that owns a chat room
//! - **GroupRole**: The role stored with a user's durable group membership
//! - **GroupMessage**: An immutable chat message posted to a group
//! - **DirectMessage**: An immutable one-to-one message between two users
//!
//! ## Repository Traits
//!
//! Each aggregate has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer.

mod user;
mod group;
mod member;
mod message;
mod direct;

pub use user::{User, UserRepository, EMAIL_TAKEN, USERNAME_TAKEN};
pub use group::{Group, GroupRepository, GroupSummary};
pub use member::GroupRole;
pub use message::{GroupMessage, MessageRepository};
pub use direct::{DirectMessage, DirectMessageRepository};

#[cfg(test)]
pub use user::MockUserRepository;
#[cfg(test)]
pub use group::MockGroupRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use direct::MockDirectMessageRepository;
