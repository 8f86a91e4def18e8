//! Slash command handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// A group of related slash commands sharing one implementation
///
/// `CommandHandler` dispatches to the handler that declares the interaction's
/// command name. Handlers send their own replies; an `Err` is logged and
/// answered with a generic failure message by the bot's event handler.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Names this handler answers to
    fn command_names(&self) -> &'static [&'static str];

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}
