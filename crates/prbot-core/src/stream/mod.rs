//! Live subprocess output
//!
//! Raw output is fed into a [`TerminalEmulator`] that keeps one full screen
//! render. A sampling loop compares consecutive renders with a
//! [`StreamStabilizer`] and only surfaces text that has stopped changing.
//! [`OutputMonitor`] wires a child process into all of this.

mod monitor;
mod prefix;
mod sampler;
mod stabilizer;
mod terminal;


pub use monitor::{MonitoredProcess, OutputMonitor, ProcessOutcome};
pub use prefix::longest_common_prefix;
pub use sampler::{MIN_SAMPLE_INTERVAL, SharedTerminal, sample_until_cancelled};
pub use stabilizer::{HISTORY_DEPTH, StabilizedUpdate, StreamStabilizer};
pub use terminal::{DEFAULT_SCROLLBACK, TerminalEmulator, VirtualTerminal};
