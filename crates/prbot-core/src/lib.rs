//! prbot supervisor core
//!
//! Building blocks for keeping a long-running chat bot alive across code
//! changes without interrupting work in flight: a debounced, idle-gated
//! restart manager, task tracking that survives restarts, and live output
//! status for child processes.

pub mod activity;
pub mod config;
pub mod error;
pub mod messaging;
pub mod storage;
pub mod stream;
pub mod supervisor;
pub mod tasks;

// Re-export commonly used types
pub use activity::{ActivityIndicator, ActivityObserver, IdleNotifier};
pub use config::{ConfigLoader, IdleTimeoutAction, SupervisorConfig};
pub use error::{BotError, BotResult};
pub use messaging::{ChatClient, MessageRef, ReactionActivityObserver, StatusMessagePublisher};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use stream::{OutputMonitor, StabilizedUpdate, StreamStabilizer, longest_common_prefix};
pub use supervisor::{RestartManager, RestartOptions, RestartPhase};
pub use tasks::{TaskKey, TaskOrchestrator, TaskState, WorkingTask, WorkingTaskRegistry};
