//! Supervisor configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `PRBOT_*` environment variables. Command-line flags are applied by the
//! CLI on top of the loaded value.

mod env_loader;
mod loader;
mod model;


pub use env_loader::{apply_env, apply_env_from};
pub use loader::{ConfigLoader, ConfigSource, load_from_file};
pub use model::{IdleTimeoutAction, LoggingConfig, SupervisorConfig};
