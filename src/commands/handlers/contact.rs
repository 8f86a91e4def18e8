//! Contact command handlers
//!
//! Handles: whois, setcontact, clearcontact
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_string_option, get_user_option};
use crate::core::embeds::{whois_embed, MemberProfile, WhoisProfile};
use crate::database::ContactUpdate;

/// Handler for contact commands
pub struct ContactHandler;

#[async_trait]
impl SlashCommandHandler for ContactHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["whois", "setcontact", "clearcontact"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "whois" => self.handle_whois(&ctx, serenity_ctx, command).await,
            "setcontact" => self.handle_setcontact(&ctx, serenity_ctx, command).await,
            "clearcontact" => self.handle_clearcontact(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl ContactHandler {
    async fn reply_ephemeral(
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        content: &str,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| msg.content(content).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    /// Handle /whois
    async fn handle_whois(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(user) = get_user_option(&command.data.options, "user") else {
            return Self::reply_ephemeral(serenity_ctx, command, "❌ Please tag a user.").await;
        };

        // Member and role lookups can take a while
        command.defer(&serenity_ctx.http).await?;

        // Banners are only present on a REST fetch of the user
        let full_user = match serenity_ctx.http.get_user(user.id.0).await {
            Ok(full) => full,
            Err(e) => {
                debug!("Falling back to resolved user {} for whois: {e}", user.id);
                user.clone()
            }
        };

        let member = match command.guild_id {
            Some(guild_id) => Self::fetch_member_profile(serenity_ctx, guild_id, &user).await,
            None => None,
        };

        let profile = WhoisProfile {
            user_id: user.id.0,
            username: user.name.clone(),
            avatar_url: Some(user.face()),
            banner_url: full_user.banner_url(),
            created_at: user.created_at().unix_timestamp(),
            member,
            requested_by: command.user.tag(),
        };
        let contact = ctx.contacts.get_contact(&user.id.to_string()).await?;
        let embed = whois_embed(&profile, contact.as_ref());

        command
            .edit_original_interaction_response(&serenity_ctx.http, |response| {
                response.set_embed(embed)
            })
            .await?;

        info!("Whois {} requested by {}", user.id, command.user.id);
        Ok(())
    }

    /// None when the user is not (or can no longer be found as) a guild member
    async fn fetch_member_profile(
        serenity_ctx: &Context,
        guild_id: GuildId,
        user: &User,
    ) -> Option<MemberProfile> {
        let member = match guild_id.member(serenity_ctx, user.id).await {
            Ok(member) => member,
            Err(e) => {
                debug!("{} is not a member of guild {guild_id}: {e}", user.id);
                return None;
            }
        };

        let guild_roles: HashMap<u64, (String, i64)> =
            match guild_id.roles(&serenity_ctx.http).await {
                Ok(roles) => roles
                    .into_iter()
                    .map(|(id, role)| (id.0, (role.name, role.position)))
                    .collect(),
                Err(e) => {
                    debug!("Could not load roles of guild {guild_id}: {e}");
                    HashMap::new()
                }
            };

        Some(member_profile(&member, guild_id.0, &guild_roles))
    }

    /// Handle /setcontact
    async fn handle_setcontact(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let Some(update) = contact_update(
            &command.user.name,
            get_string_option(options, "phone"),
            get_string_option(options, "address"),
            get_string_option(options, "global_name"),
        ) else {
            return Self::reply_ephemeral(
                serenity_ctx,
                command,
                "❌ Provide at least one of `phone`, `address` or `global_name`.",
            )
            .await;
        };

        ctx.contacts
            .upsert_contact(&command.user.id.to_string(), update)
            .await?;

        Self::reply_ephemeral(
            serenity_ctx,
            command,
            "✅ Contact saved. See it with `/whois`.",
        )
        .await
    }

    /// Handle /clearcontact
    async fn handle_clearcontact(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let deleted = ctx.contacts.delete_contact(&user_id).await?;
        let content = if deleted {
            "🗑️ Contact deleted."
        } else {
            "ℹ️ You have no saved contact."
        };
        Self::reply_ephemeral(serenity_ctx, command, content).await
    }
}

/// Trimmed `/setcontact` input, or None when no contact field was given
///
/// The username is always refreshed alongside the supplied fields.
pub fn contact_update(
    username: &str,
    phone: Option<String>,
    address: Option<String>,
    global_name: Option<String>,
) -> Option<ContactUpdate> {
    let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
    let update = ContactUpdate {
        username: Some(username.to_string()),
        global_name: trim(global_name),
        phone: trim(phone),
        address: trim(address),
    };
    if update.phone.is_none() && update.address.is_none() && update.global_name.is_none() {
        return None;
    }
    Some(update)
}

fn member_profile(
    member: &Member,
    guild_id: u64,
    guild_roles: &HashMap<u64, (String, i64)>,
) -> MemberProfile {
    let member_roles: Vec<u64> = member.roles.iter().map(|id| id.0).collect();
    let (highest_role, role_ids) = rank_roles(&member_roles, guild_roles, guild_id);
    MemberProfile {
        nickname: member.nick.clone(),
        joined_at: member.joined_at.map(|t| t.unix_timestamp()),
        highest_role,
        role_ids,
    }
}

/// Order a member's roles highest position first, dropping `@everyone`
///
/// `@everyone` shares the guild's id. Roles missing from `guild_roles` sort last.
fn rank_roles(
    member_roles: &[u64],
    guild_roles: &HashMap<u64, (String, i64)>,
    everyone: u64,
) -> (Option<String>, Vec<u64>) {
    let position = |id: &u64| guild_roles.get(id).map_or(i64::MIN, |(_, pos)| *pos);

    let mut ranked: Vec<u64> = member_roles
        .iter()
        .copied()
        .filter(|id| *id != everyone)
        .collect();
    ranked.sort_by(|a, b| position(b).cmp(&position(a)).then(a.cmp(b)));

    let highest = ranked
        .first()
        .and_then(|id| guild_roles.get(id))
        .map(|(name, _)| name.clone());
    (highest, ranked)
}
