//! Conversational task tracking
//!
//! - [`TaskState`]: lifecycle of one unit of conversational work
//! - [`WorkingTaskRegistry`]: persisted list of in-flight work, read at startup
//! - [`TaskStatusStore`]: per-task status records
//! - [`TaskOrchestrator`]: owns the live handles and drives resume-at-startup

mod orchestrator;
mod state;
mod status;
mod types;
mod working;

#[cfg(test)]
mod tests;

pub use orchestrator::{ResumeReport, TaskHandle, TaskOrchestrator, TaskResumer};
pub use state::TaskState;
pub use status::{TaskStatusRecord, TaskStatusStore};
pub use types::{TaskKey, WorkingTask};
pub use working::{WORKING_TASKS_KEY, WorkingTaskRegistry, WorkingTasksRecord};
