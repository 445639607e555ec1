pub mod commands;
pub mod handlers;

pub use commands::{Cli, Commands, ConfigCommands, ModelCommands, SplitArgs};
pub use handlers::handle_command;
