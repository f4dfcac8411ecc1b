//! Busy/idle detection for bursty output streams
//!
//! - [`IdleNotifier`]: `ping` on activity, `wait` for a quiet window
//! - [`ActivityIndicator`]: turns chunk arrivals into one busy and one idle
//!   side effect per burst

mod indicator;
mod notifier;

#[cfg(test)]
mod tests;

pub use indicator::{ActivityIndicator, ActivityObserver, LogActivityObserver};
pub use notifier::IdleNotifier;
