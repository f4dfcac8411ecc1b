//! Chat collaborator seam
//!
//! The chat service itself is out of scope; [`ChatClient`] is the boundary.
//! The adapters here turn activity and stabilized output into chat calls.

mod client;
mod observer;
mod publisher;
mod types;

#[cfg(test)]
mod tests;

#[cfg(test)]
pub use client::MockChatClient;
pub use client::{ChatClient, LogChatClient};
pub use observer::ReactionActivityObserver;
pub use publisher::StatusMessagePublisher;
pub use types::{MessageRef, PostTarget};
