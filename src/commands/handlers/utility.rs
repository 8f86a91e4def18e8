//! Utility command handlers
//!
//! Handles: ping, echo
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use std::time::Instant;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::core::truncate_for_message;

/// Handler for utility commands: ping, echo
pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ping", "echo"]
    }

    async fn handle(
        &self,
        _ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "ping" => self.handle_ping(serenity_ctx, command).await,
            "echo" => self.handle_echo(serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl UtilityHandler {
    /// Handle /ping command
    async fn handle_ping(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let started = Instant::now();
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content("Pong!"))
            })
            .await?;
        let latency = started.elapsed().as_millis();

        command
            .edit_original_interaction_response(&serenity_ctx.http, |response| {
                response.content(format!("Pong! 🏓 Latency ~{latency}ms"))
            })
            .await?;

        info!("Ping command completed for user {}", command.user.id);
        Ok(())
    }

    /// Handle /echo command
    async fn handle_echo(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let text = get_string_option(&command.data.options, "text").unwrap_or_default();
        let reply = echo_text(&text);

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .content(reply)
                            .allowed_mentions(|m| m.empty_parse())
                    })
            })
            .await?;

        Ok(())
    }
}

fn echo_text(text: &str) -> String {
    truncate_for_message(&format!("🔊 {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_handler_commands() {
        let handler = UtilityHandler;
        let names = handler.command_names();

        assert!(names.contains(&"ping"));
        assert!(names.contains(&"echo"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_echo_text() {
        assert_eq!(echo_text("halo"), "🔊 halo");
        assert!(echo_text(&"x".repeat(3000)).len() <= crate::core::MESSAGE_LIMIT);
    }
}
