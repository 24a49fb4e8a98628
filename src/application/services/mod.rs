//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, access token issuance and verification
//! - **GroupService**: Group lifecycle, membership and message history
//! - **MessageService**: The real-time group send path (authorize, persist, broadcast)
//! - **DirectMessageService**: One-to-one messages and conversation history

pub mod auth_service;
pub mod direct_service;
pub mod group_service;
pub mod message_service;

// Re-export auth service types
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, TokenService};

// Re-export group service types
pub use group_service::{
    CreateGroupDto, GroupError, GroupService, GroupServiceImpl, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};

// Re-export direct message service types
pub use direct_service::{
    DirectError, DirectMessageService, DirectMessageServiceImpl, SendDirectDto,
};

// Re-export message service types
pub use message_service::{MessageError, MessageService, MessageServiceImpl, SendMessageDto};

#[cfg(test)]
pub use direct_service::MockDirectMessageService;
#[cfg(test)]
pub use message_service::MockMessageService;
