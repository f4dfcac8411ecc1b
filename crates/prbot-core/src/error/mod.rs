//! Error types for prbot
//!
//! Every fallible operation in the core crate returns [`BotResult`]. Variants
//! carry a human-readable message plus optional context describing where the
//! failure happened.

mod constructors;
mod conversions;
mod types;


pub use types::{BotError, BotResult};
