//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    CreateGroupRequest, LoginRequest, MessagesQuery, RegisterRequest, SendDirectRequest,
};
pub use response::{
    DirectMessageResponse, GroupCreatedResponse, GroupSummaryResponse, MessageResponse, RegisterResponse, TokenResponse,
    UserResponse,
};
