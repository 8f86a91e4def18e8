//! # Command Dispatcher
//!
//! Routes slash command interactions to registered handlers and tags every
//! log line of a request with a `[request_id]`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::commands::handlers::create_all_handlers;
use crate::commands::{CommandContext, SlashCommandHandler};

#[derive(Clone)]
pub struct CommandHandler {
    /// Command name -> handler; a handler appears once per name it declares
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
    context: Arc<CommandContext>,
}

impl CommandHandler {
    /// Build a dispatcher with every built-in handler registered
    pub fn new(context: Arc<CommandContext>) -> Self {
        let mut handlers = HashMap::new();
        for handler in create_all_handlers() {
            for name in handler.command_names() {
                handlers.insert(*name, Arc::clone(&handler));
            }
        }
        debug!("Registered {} slash command names", handlers.len());
        Self { handlers, context }
    }

    pub fn context(&self) -> Arc<CommandContext> {
        Arc::clone(&self.context)
    }

    /// Whether `/name` has a handler
    pub fn handles(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let user_id = command.user.id.to_string();
        let channel_id = command.channel_id.to_string();
        let guild_id = command
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "DM".to_string());

        info!(
            "[{}] 📥 Slash command received | Command: {} | User: {} | Channel: {} | Guild: {}",
            request_id, command.data.name, user_id, channel_id, guild_id
        );

        let Some(handler) = self.handlers.get(command.data.name.as_str()) else {
            warn!("[{request_id}] ❓ Unknown slash command: {}", command.data.name);
            command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content("Unknown command.").ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        let result = handler.handle(self.context(), ctx, command).await;
        match &result {
            Ok(()) => info!(
                "[{}] ✅ /{} completed in {}ms",
                request_id,
                command.data.name,
                started.elapsed().as_millis()
            ),
            Err(e) => warn!("[{request_id}] ❌ /{} failed: {e:#}", command.data.name),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::test_context;

    #[test]
    fn test_new_registers_every_command() {
        let handler = CommandHandler::new(Arc::new(test_context()));
        for name in [
            "ping",
            "echo",
            "addreminder",
            "reminders",
            "addwatchlist",
            "watchlist",
            "completedwatchlist",
            "whois",
            "setcontact",
            "clearcontact",
        ] {
            assert!(handler.handles(name), "missing {name}");
        }
        assert!(!handler.handles("ask"));
        assert_eq!(handler.handlers.len(), 10);
    }

    #[test]
    fn test_clones_share_context() {
        let handler = CommandHandler::new(Arc::new(test_context()));
        let clone = handler.clone();
        assert!(Arc::ptr_eq(&handler.context(), &clone.context()));
    }
}
