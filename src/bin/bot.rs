use anyhow::{Context as _, Result};
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use pengingat::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandHandler,
};
use pengingat::core::Config;
use pengingat::database::{ContactStore, ReminderStore, WatchlistStore};
use pengingat::features::reminders::{DiscordDelivery, ReminderScheduler, TimeConvention};
use pengingat::message_components::MessageComponentHandler;

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(
        command_handler: CommandHandler,
        component_handler: MessageComponentHandler,
        guild_id: Option<GuildId>,
    ) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
            component_handler: Arc::new(component_handler),
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands for guild {guild_id} (instant update)");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands globally (may take up to 1 hour to propagate)");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self
                    .command_handler
                    .handle_slash_command(&ctx, &command)
                    .await
                {
                    error!(
                        "Error handling slash command '{}': {:#}",
                        command.data.name, e
                    );

                    let error_message = "❌ Sorry, I encountered an error processing your command. Please try again.";

                    // Fall back to editing when the handler already responded
                    if command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(error_message).ephemeral(true)
                                })
                        })
                        .await
                        .is_err()
                    {
                        let _ = command
                            .edit_original_interaction_response(&ctx.http, |response| {
                                response.content(error_message)
                            })
                            .await;
                    }
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {:#}",
                        component.data.custom_id, e
                    );

                    let _ = component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message
                                        .content("❌ Sorry, I encountered an error processing your interaction. Please try again.")
                                        .ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");
    info!("📁 Data directory: {}", config.data_dir.display());

    let time = TimeConvention::new(config.tz_offset_minutes, config.tz_label.clone())?;
    let reminders =
        ReminderStore::new(config.reminders_path()).with_token_ttl(config.reminder_token_ttl)?;
    let watchlist = WatchlistStore::new(config.watchlist_path());
    let contacts = ContactStore::new(config.contacts_path());

    // Fail startup on an unreadable or malformed document
    reminders
        .load()
        .await
        .context("Failed to load reminder store")?;
    watchlist
        .load()
        .await
        .context("Failed to load watchlist store")?;
    contacts
        .load()
        .await
        .context("Failed to load contact store")?;
    info!("💾 Document stores loaded");

    let context = Arc::new(
        CommandContext::new(reminders.clone(), watchlist, contacts, time)
            .with_watch_search(config.watch_search_url.clone()),
    );
    let command_handler = CommandHandler::new(Arc::clone(&context));
    let component_handler = MessageComponentHandler::new(context);

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler::new(command_handler, component_handler, guild_id);

    // Slash commands and buttons only need guild events
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder scheduler
    let delivery = Arc::new(DiscordDelivery::new(client.cache_and_http.http.clone()));
    let scheduler = ReminderScheduler::new(reminders, delivery, config.reminder_tick).spawn();

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Ctrl-C received, shutting down...");
                shard_manager.lock().await.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    let result = client.start().await;
    scheduler.shutdown().await;

    if let Err(why) = result {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    info!("👋 Bot stopped");
    Ok(())
}
