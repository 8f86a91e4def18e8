//! # Message Components
//!
//! Buttons attached to bot replies. The only component flow is the reminder
//! Confirm/Cancel pair created by `/addreminder`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serenity::builder::CreateComponents;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::UserId;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::CommandContext;
use crate::database::TargetType;
use crate::features::reminders::{
    cancel_custom_id, confirm_custom_id, mention, ConfirmationEvent, ConfirmationOutcome,
    TimeConvention,
};

/// How a component reply is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReply {
    pub content: String,
    /// Visible only to the clicking user
    pub ephemeral: bool,
    /// Replace the prompt message (and drop its buttons) instead of posting a new one
    pub update_prompt: bool,
    /// Users that may be pinged by the reply
    pub mention_users: Vec<u64>,
}

/// Handler for all message component interactions
pub struct MessageComponentHandler {
    ctx: Arc<CommandContext>,
}

impl MessageComponentHandler {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    /// Handle all types of component interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();

        info!("Processing component interaction: {custom_id} from user: {user_id}");

        let Some(event) = ConfirmationEvent::from_custom_id(custom_id) else {
            warn!("Unknown component interaction: {custom_id}");
            interaction
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content("Unknown component interaction.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        let outcome = self.ctx.confirmations.handle(&event).await?;
        let reply = reply_for_outcome(&outcome, &self.ctx.time, Utc::now());

        let kind = if reply.update_prompt {
            InteractionResponseType::UpdateMessage
        } else {
            InteractionResponseType::ChannelMessageWithSource
        };
        let mention_users: Vec<UserId> = reply.mention_users.iter().copied().map(UserId).collect();

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response.kind(kind).interaction_response_data(|message| {
                    message
                        .content(&reply.content)
                        .allowed_mentions(|m| m.empty_parse().users(mention_users));
                    if reply.update_prompt {
                        message.components(|c| c); // Clear components
                    }
                    if reply.ephemeral {
                        message.ephemeral(true);
                    }
                    message
                })
            })
            .await?;

        Ok(())
    }

    /// Confirm/Cancel buttons for a staged reminder token
    pub fn create_reminder_buttons(token: &str) -> CreateComponents {
        CreateComponents::default()
            .create_action_row(|row| {
                row.create_button(|button| {
                    button
                        .custom_id(confirm_custom_id(token))
                        .label("Confirm")
                        .style(ButtonStyle::Success)
                })
                .create_button(|button| {
                    button
                        .custom_id(cancel_custom_id(token))
                        .label("Cancel")
                        .style(ButtonStyle::Secondary)
                })
            })
            .to_owned()
    }
}

/// Text and visibility of the reply to a confirm/cancel click
pub fn reply_for_outcome(
    outcome: &ConfirmationOutcome,
    time: &TimeConvention,
    now: DateTime<Utc>,
) -> ComponentReply {
    match outcome {
        ConfirmationOutcome::Committed { id, draft } => {
            let mut mention_users: Vec<u64> =
                draft.created_by.parse::<u64>().into_iter().collect();
            if draft.target_type == TargetType::User {
                if let Ok(target) = draft.target_id.parse::<u64>() {
                    if !mention_users.contains(&target) {
                        mention_users.push(target);
                    }
                }
            }
            ComponentReply {
                content: format!(
                    "✅ Reminder saved (#{}). I'll remind \"{}\" {} in {}.",
                    id,
                    draft.message,
                    time.describe(draft.remind_at, now),
                    mention(draft.target_type, &draft.target_id)
                ),
                ephemeral: false,
                update_prompt: false,
                mention_users,
            }
        }
        // The prompt is already ephemeral; updating it keeps it that way
        ConfirmationOutcome::Cancelled => ComponentReply {
            content: "❎ Cancelled.".to_string(),
            ephemeral: false,
            update_prompt: true,
            mention_users: Vec::new(),
        },
        ConfirmationOutcome::InvalidOrExpired => ComponentReply {
            content: "❌ Token invalid/expired.".to_string(),
            ephemeral: true,
            update_prompt: false,
            mention_users: Vec::new(),
        },
    }
}
