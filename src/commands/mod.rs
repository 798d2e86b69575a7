// src/commands/mod.rs
mod commit;
mod config;
mod hook;

pub use commit::{cmd_commit, MessageSink};
pub use config::{cmd_config, cmd_init, cmd_types};
pub use hook::cmd_hook;
