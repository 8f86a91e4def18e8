//! Reminder command handlers
//!
//! Handles: addreminder, reminders
//!
//! `/addreminder` never writes a reminder directly. It validates the input,
//! stages a draft, and answers with Confirm/Cancel buttons; the button press
//! is handled by `MessageComponentHandler`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::core::{truncate_chars, truncate_for_message};
use crate::database::{Reminder, ReminderStatus};
use crate::features::reminders::{
    mention, ReminderDraft, ReminderInputError, ReminderTarget, TimeConvention,
};
use crate::message_components::MessageComponentHandler;

/// Reminders shown per `/reminders` reply
const LIST_LIMIT: usize = 15;

/// Raw `/addreminder` input
#[derive(Debug, Clone, Default)]
pub struct ReminderRequest {
    pub created_by: String,
    pub guild_id: Option<String>,
    pub target: String,
    pub date: String,
    pub time: String,
    pub message: String,
}

/// Handler for reminder commands
pub struct RemindHandler;

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["addreminder", "reminders"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "addreminder" => self.handle_addreminder(&ctx, serenity_ctx, command).await,
            "reminders" => self.handle_reminders(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Handle /addreminder - validate, stage, and ask for confirmation
    async fn handle_addreminder(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let request = ReminderRequest {
            created_by: command.user.id.to_string(),
            guild_id: command.guild_id.map(|id| id.to_string()),
            target: get_string_option(options, "target").unwrap_or_default(),
            date: get_string_option(options, "date").unwrap_or_default(),
            time: get_string_option(options, "time").unwrap_or_default(),
            message: get_string_option(options, "message").unwrap_or_default(),
        };

        let now = Utc::now();
        let draft = match build_draft(&request, &ctx.time, now) {
            Ok(draft) => draft,
            Err(e) => {
                debug!("Rejected /addreminder from {}: {e}", request.created_by);
                command
                    .create_interaction_response(&serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|msg| {
                                msg.content(format!("❌ {e}")).ephemeral(true)
                            })
                    })
                    .await?;
                return Ok(());
            }
        };

        let token = ctx.confirmations.stage(&draft).await?;
        let prompt = confirmation_prompt(&draft, &ctx.time, now);

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| {
                        msg.content(prompt)
                            .ephemeral(true)
                            .set_components(MessageComponentHandler::create_reminder_buttons(
                                &token,
                            ))
                    })
            })
            .await?;

        info!(
            "Reminder confirmation prompt sent to {} (token {token})",
            request.created_by
        );
        Ok(())
    }

    /// Handle /reminders - list the caller's reminders
    async fn handle_reminders(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let filter = get_string_option(&command.data.options, "status");
        let status = match parse_status_filter(filter.as_deref()) {
            Ok(status) => status,
            Err(e) => {
                command
                    .create_interaction_response(&serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|msg| {
                                msg.content(format!("❌ {e}")).ephemeral(true)
                            })
                    })
                    .await?;
                return Ok(());
            }
        };

        let mut reminders = ctx.reminders.list_for_owner(&user_id, status).await?;
        reminders.sort_by_key(|r| r.remind_at);
        let content = reminder_list(&reminders, status, &ctx.time);

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| {
                        msg.content(content)
                            .ephemeral(true)
                            .allowed_mentions(|m| m.empty_parse())
                    })
            })
            .await?;

        Ok(())
    }
}

/// Validate raw input into a draft ready for staging
pub fn build_draft(
    request: &ReminderRequest,
    time: &TimeConvention,
    now: DateTime<Utc>,
) -> Result<ReminderDraft, ReminderInputError> {
    let target = ReminderTarget::parse(&request.target)?;
    let remind_at = time.parse_future(&request.date, &request.time, now)?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ReminderInputError::EmptyMessage);
    }

    Ok(ReminderDraft {
        created_by: request.created_by.clone(),
        guild_id: request.guild_id.clone(),
        target_type: target.target_type,
        target_id: target.target_id,
        message: message.to_string(),
        remind_at,
        date_str: Some(request.date.trim().to_string()),
        time_str: Some(request.time.trim().to_string()),
    })
}

pub fn confirmation_prompt(
    draft: &ReminderDraft,
    time: &TimeConvention,
    now: DateTime<Utc>,
) -> String {
    truncate_for_message(&format!(
        "Confirm reminder:\nTarget: {}\nWhen: {}\nMessage: {}",
        mention(draft.target_type, &draft.target_id),
        time.describe(draft.remind_at, now),
        draft.message
    ))
}

/// No option lists pending reminders; `all` lists every status
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<ReminderStatus>> {
    match raw {
        None => Ok(Some(ReminderStatus::Pending)),
        Some("all") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

fn status_icon(status: ReminderStatus) -> &'static str {
    match status {
        ReminderStatus::Pending => "⏳",
        ReminderStatus::Sent => "✅",
        ReminderStatus::Failed => "❌",
        ReminderStatus::Cancelled => "🚫",
    }
}

pub fn reminder_line(reminder: &Reminder, time: &TimeConvention) -> String {
    let mut line = format!(
        "`#{}` {} **{}** → {} — {}",
        reminder.id,
        status_icon(reminder.status),
        time.format(reminder.remind_at),
        mention(reminder.target_type, &reminder.target_id),
        truncate_chars(&reminder.message, 80)
    );
    if let Some(error) = &reminder.error {
        line.push_str(&format!(" (error: {})", truncate_chars(error, 80)));
    }
    line
}

pub fn reminder_list(
    reminders: &[Reminder],
    status: Option<ReminderStatus>,
    time: &TimeConvention,
) -> String {
    let scope = status.map_or_else(|| "all".to_string(), |s| s.to_string());
    if reminders.is_empty() {
        return format!("📭 You have no reminders ({scope}).");
    }

    let mut output = format!("**Your reminders ({scope})**\n");
    for reminder in reminders.iter().take(LIST_LIMIT) {
        output.push_str(&reminder_line(reminder, time));
        output.push('\n');
    }
    if reminders.len() > LIST_LIMIT {
        output.push_str(&format!("*Showing {LIST_LIMIT} of {}*", reminders.len()));
    }
    truncate_for_message(output.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::test_context;
    use crate::database::{NewReminder, TargetType};
    use crate::features::reminders::{ConfirmationEvent, ConfirmationOutcome};
    use chrono::TimeZone;

    fn wib() -> TimeConvention {
        TimeConvention::new(420, "WIB").unwrap()
    }

    fn now() -> DateTime<Utc> {
        // 2026-10-18 12:00 WIB
        Utc.with_ymd_and_hms(2026, 10, 18, 5, 0, 0).unwrap()
    }

    fn request() -> ReminderRequest {
        ReminderRequest {
            created_by: "111111111111111111".to_string(),
            guild_id: Some("999999999999999999".to_string()),
            target: "<#222222222222222222>".to_string(),
            date: "2026-10-18".to_string(),
            time: "21:00".to_string(),
            message: "  standup notes  ".to_string(),
        }
    }

    #[test]
    fn test_remind_handler_commands() {
        let names = RemindHandler.command_names();
        assert_eq!(names, &["addreminder", "reminders"]);
    }

    #[test]
    fn test_build_draft_valid() {
        let draft = build_draft(&request(), &wib(), now()).unwrap();
        assert_eq!(draft.target_type, TargetType::Channel);
        assert_eq!(draft.target_id, "222222222222222222");
        assert_eq!(draft.message, "standup notes");
        assert_eq!(
            draft.remind_at,
            Utc.with_ymd_and_hms(2026, 10, 18, 14, 0, 0).unwrap()
        );
        assert_eq!(draft.date_str.as_deref(), Some("2026-10-18"));
    }

    #[test]
    fn test_build_draft_rejections() {
        let mut bad_target = request();
        bad_target.target = "general".to_string();
        assert!(matches!(
            build_draft(&bad_target, &wib(), now()),
            Err(ReminderInputError::InvalidTarget(_))
        ));

        let mut bad_date = request();
        bad_date.date = "18-10-2026".to_string();
        assert!(matches!(
            build_draft(&bad_date, &wib(), now()),
            Err(ReminderInputError::InvalidDateTime { .. })
        ));

        let mut past = request();
        past.time = "11:59".to_string();
        assert_eq!(
            build_draft(&past, &wib(), now()).unwrap_err(),
            ReminderInputError::NotInFuture
        );

        let mut blank = request();
        blank.message = "   ".to_string();
        assert_eq!(
            build_draft(&blank, &wib(), now()).unwrap_err(),
            ReminderInputError::EmptyMessage
        );
    }

    #[test]
    fn test_confirmation_prompt() {
        let draft = build_draft(&request(), &wib(), now()).unwrap();
        let prompt = confirmation_prompt(&draft, &wib(), now());
        assert_eq!(
            prompt,
            "Confirm reminder:\nTarget: <#222222222222222222>\nWhen: today, Sunday, 18 October 2026 21:00 WIB\nMessage: standup notes"
        );
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), Some(ReminderStatus::Pending));
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("failed")).unwrap(),
            Some(ReminderStatus::Failed)
        );
        assert!(parse_status_filter(Some("snoozed")).is_err());
    }

    #[test]
    fn test_reminder_list_empty_and_limited() {
        assert_eq!(
            reminder_list(&[], Some(ReminderStatus::Pending), &wib()),
            "📭 You have no reminders (pending)."
        );

        let reminders: Vec<Reminder> = (1..=20)
            .map(|id| Reminder {
                id,
                created_by: "1".to_string(),
                guild_id: None,
                target_type: TargetType::User,
                target_id: "2".to_string(),
                message: format!("item {id}"),
                remind_at: now(),
                status: ReminderStatus::Failed,
                created_at: now(),
                updated_at: now(),
                sent_at: None,
                error: Some("Missing Access".to_string()),
            })
            .collect();
        let list = reminder_list(&reminders, None, &wib());
        assert!(list.starts_with("**Your reminders (all)**"));
        assert!(list.contains(
            "`#1` ❌ **Sunday, 18 October 2026 12:00 WIB** → <@2> — item 1 (error: Missing Access)"
        ));
        assert!(!list.contains("`#16`"));
        assert!(list.ends_with("*Showing 15 of 20*"));
    }

    #[tokio::test]
    async fn test_staged_draft_commits_through_confirmation() {
        let ctx = test_context();
        let draft = build_draft(&request(), &ctx.time, now()).unwrap();
        let token = ctx.confirmations.stage(&draft).await.unwrap();

        let outcome = ctx
            .confirmations
            .handle(&ConfirmationEvent::Confirm(token))
            .await
            .unwrap();
        assert!(matches!(outcome, ConfirmationOutcome::Committed { id: 1, .. }));

        let owned = ctx
            .reminders
            .list_for_owner("111111111111111111", Some(ReminderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].message, "standup notes");

        // Another owner sees nothing
        ctx.reminders
            .commit(NewReminder {
                created_by: "333".to_string(),
                guild_id: None,
                target_type: TargetType::User,
                target_id: "333".to_string(),
                message: "x".to_string(),
                remind_at: now(),
            })
            .await
            .unwrap();
        assert_eq!(
            ctx.reminders
                .list_for_owner("111111111111111111", None)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
