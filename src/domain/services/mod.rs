//! # Domain Services
//!
//! Contracts the application layer depends on but which are fulfilled
//! outside the domain.
//!
//! - **RoomBroadcaster**: fan-out of persisted group messages to live room subscribers
//! - **DirectBroadcaster**: delivery of direct messages to both participants' connections

mod broadcaster;

pub use broadcaster::*;
