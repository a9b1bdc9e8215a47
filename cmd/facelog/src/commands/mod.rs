//! CLI commands module.

mod config;
mod identify;
mod logs;
mod register;
mod run;
mod users;
mod util;

pub use config::ConfigCommand;
pub use identify::IdentifyCommand;
pub use logs::LogsCommand;
pub use register::RegisterCommand;
pub use run::RunCommand;
pub use users::UsersCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
