//! # Reminder Commands
//!
//! `/addreminder` stages a reminder behind Confirm/Cancel buttons;
//! `/reminders` lists the caller's reminders.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_addreminder_command(), create_reminders_command()]
}

fn create_addreminder_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("addreminder")
        .description("Set a reminder to a channel or DM a user")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("target")
                .description("#channel or @user")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("date")
                .description("Date (YYYY-MM-DD)")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(10)
                .max_length(10)
        })
        .create_option(|option| {
            option
                .name("time")
                .description("Time (HH:mm, 24h)")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(4)
                .max_length(5)
        })
        .create_option(|option| {
            option
                .name("message")
                .description("What to remind about")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(1800)
        });
    command
}

fn create_reminders_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("reminders")
        .description("List the reminders you created")
        .create_option(|option| {
            option
                .name("status")
                .description("Filter by status (default: pending)")
                .kind(CommandOptionType::String)
                .required(false)
                .add_string_choice("pending", "pending")
                .add_string_choice("sent", "sent")
                .add_string_choice("failed", "failed")
                .add_string_choice("all", "all")
        });
    command
}
