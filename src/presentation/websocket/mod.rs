//! WebSocket Gateway
//!
//! Real-time group chat over WebSocket connections.

pub mod auth_gate;
pub mod handler;
pub mod messages;
pub mod registry;
pub mod session;

pub use auth_gate::{authenticate, HandshakeError};
pub use handler::{dispatch, ws_handler};
pub use messages::{ClientEvent, ClientFrame, EventError, ServerFrame};
pub use registry::{ConnectionRegistry, FrameSender};
pub use session::{Connection, ConnectionId};
