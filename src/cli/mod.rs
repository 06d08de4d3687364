mod args;
mod chat;
mod commands;
mod transport;

pub use args::{Cli, Commands, ConfigSubcommands};
pub use chat::{run_ask, run_chat};
pub use commands::{HELP_TEXT, SlashCommand};
pub use transport::{create_session, create_transport};
