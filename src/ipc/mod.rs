//! Wire protocol and TCP server for landmark clients.

pub mod protocol;
pub mod server;

pub use protocol::{InboundMessage, OutboundMessage, WireHand, frame_from_wire};
pub use server::CaptionServer;
