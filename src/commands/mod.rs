//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod context;
pub mod handler;
pub mod handlers;
pub mod slash;

pub use crate::command_handler::CommandHandler;

// Re-export handler infrastructure
pub use context::CommandContext;
pub use handler::SlashCommandHandler;

// Re-export commonly used items from submodules
pub use slash::{
    create_slash_commands, get_integer_option, get_string_option, get_user_option,
    register_global_commands, register_guild_commands,
};
