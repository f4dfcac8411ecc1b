//! prbot
//!
//! Facade over [`prbot_core`]. The `prbot` binary lives in the `prbot-cli`
//! crate.

pub use prbot_core::*;
