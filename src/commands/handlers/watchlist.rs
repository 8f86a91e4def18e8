//! Watchlist command handlers
//!
//! Handles: addwatchlist, watchlist, completedwatchlist
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

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_integer_option, get_string_option, get_user_option};
use crate::core::embeds::watchlist_embed;
use crate::database::{NewWatchlistItem, WatchlistStatus};

/// Handler for watchlist commands
pub struct WatchlistHandler;

#[async_trait]
impl SlashCommandHandler for WatchlistHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["addwatchlist", "watchlist", "completedwatchlist"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "addwatchlist" => self.handle_add(&ctx, serenity_ctx, command).await,
            "watchlist" => self.handle_list(&ctx, serenity_ctx, command).await,
            "completedwatchlist" => self.handle_complete(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl WatchlistHandler {
    async fn reply(
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        content: String,
        ephemeral: bool,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| {
                        msg.content(content)
                            .ephemeral(ephemeral)
                            .allowed_mentions(|m| m.empty_parse())
                    })
            })
            .await?;
        Ok(())
    }

    /// Handle /addwatchlist
    async fn handle_add(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let user_id = command.user.id.to_string();
        let new = NewWatchlistItem {
            title: get_string_option(options, "title").unwrap_or_default(),
            year: get_string_option(options, "year"),
            platform: get_string_option(options, "platform"),
            link: get_string_option(options, "link"),
            note: get_string_option(options, "note"),
        };

        if new.title.trim().is_empty() {
            return Self::reply(
                serenity_ctx,
                command,
                "❌ Title must not be empty.".to_string(),
                true,
            )
            .await;
        }

        let title = new.title.trim().to_string();
        let year = new.year.clone().filter(|y| !y.trim().is_empty());
        let id = ctx.watchlist.add_item(&user_id, new).await?;

        Self::reply(serenity_ctx, command, added_message(id, &title, year.as_deref()), false).await
    }

    /// Handle /watchlist
    async fn handle_list(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let owner = get_user_option(options, "user").unwrap_or_else(|| command.user.clone());
        let status = match get_string_option(options, "status") {
            Some(raw) => match raw.parse::<WatchlistStatus>() {
                Ok(status) => Some(status),
                Err(e) => return Self::reply(serenity_ctx, command, format!("❌ {e}"), true).await,
            },
            None => None,
        };

        let owner_id = owner.id.to_string();
        let items = ctx.watchlist.list_items(&owner_id, status).await?;

        if items.is_empty() {
            return Self::reply(serenity_ctx, command, empty_message(&owner_id, status), false)
                .await;
        }

        let embed = watchlist_embed(&owner.name, &items, ctx.watch_search.as_deref());
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| msg.set_embed(embed))
            })
            .await?;

        info!(
            "Listed {} watchlist item(s) of {} for {}",
            items.len(),
            owner_id,
            command.user.id
        );
        Ok(())
    }

    /// Handle /completedwatchlist
    async fn handle_complete(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let raw_id = get_integer_option(&command.data.options, "id").unwrap_or(0);

        let completed = match u64::try_from(raw_id) {
            Ok(id) if id > 0 => ctx.watchlist.complete_item(&user_id, id).await?,
            _ => false,
        };

        Self::reply(serenity_ctx, command, completed_message(raw_id, completed), true).await
    }
}

fn added_message(id: u64, title: &str, year: Option<&str>) -> String {
    match year {
        Some(year) => format!("✅ Added `{id}` **{title}** ({}) to your watchlist.", year.trim()),
        None => format!("✅ Added `{id}` **{title}** to your watchlist."),
    }
}

fn empty_message(owner_id: &str, status: Option<WatchlistStatus>) -> String {
    match status {
        Some(status) => format!("📭 Watchlist is empty for <@{owner_id}> (status: {status})."),
        None => format!("📭 Watchlist is empty for <@{owner_id}>."),
    }
}

fn completed_message(id: i64, completed: bool) -> String {
    if completed {
        format!("✅ Item `{id}` marked as done.")
    } else {
        format!("❌ Item `{id}` not found.")
    }
}
