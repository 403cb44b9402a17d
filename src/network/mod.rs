//! Network layer - transports and the actor that runs them
//!
//! The Network actor receives dispatch commands and sends back results.

pub mod actor;
pub mod client;
pub mod sandbox;
pub mod transport;

pub use actor::NetworkActor;
pub use client::PrivilegedTransport;
pub use sandbox::SandboxedTransport;
pub use transport::{OutgoingRequest, Transport};
