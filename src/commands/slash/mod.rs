//! # Slash Commands (/)
//!
//! Command definitions, registration, and option helpers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

mod contact;
mod remind;
mod utility;
mod watchlist;

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::Context;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    let mut commands = Vec::new();

    // Utility commands
    commands.extend(utility::create_commands());

    // Reminder commands
    commands.extend(remind::create_commands());

    // Watchlist commands
    commands.extend(watchlist::create_commands());

    // Contact commands
    commands.extend(contact::create_commands());

    commands
}

/// Registers all slash commands globally
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

/// Registers all slash commands for a specific guild (faster for testing)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild slash commands registered for guild {guild_id} ({count} commands)");
    Ok(())
}

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Utility function to get integer option from slash command
pub fn get_integer_option(options: &[CommandDataOption], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_i64())
}

/// Utility function to get a resolved user option from slash command
pub fn get_user_option(options: &[CommandDataOption], name: &str) -> Option<User> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.resolved.as_ref())
        .and_then(|resolved| match resolved {
            CommandDataOptionValue::User(user, _) => Some(user.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_names() -> Vec<String> {
        create_slash_commands()
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_create_slash_commands() {
        let names = command_names();
        let expected_commands = vec![
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
        ];

        assert_eq!(names.len(), expected_commands.len());
        for expected in expected_commands {
            assert!(
                names.contains(&expected.to_string()),
                "Missing command: {expected}"
            );
        }
    }

    #[test]
    fn test_addreminder_options_are_required() {
        let commands = create_slash_commands();
        let addreminder = commands
            .iter()
            .find(|cmd| cmd.0.get("name").and_then(|v| v.as_str()) == Some("addreminder"))
            .unwrap();

        let options = addreminder.0.get("options").unwrap().as_array().unwrap();
        let names: Vec<&str> = options
            .iter()
            .map(|opt| opt.get("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["target", "date", "time", "message"]);
        assert!(options
            .iter()
            .all(|opt| opt.get("required").and_then(|v| v.as_bool()) == Some(true)));
    }

    #[test]
    fn test_option_helpers_on_empty_options() {
        assert_eq!(get_string_option(&[], "title"), None);
        assert_eq!(get_integer_option(&[], "id"), None);
        assert!(get_user_option(&[], "user").is_none());
    }
}
