//! Watchlist slash commands: /addwatchlist, /watchlist, /completedwatchlist

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_addwatchlist_command(),
        create_watchlist_command(),
        create_completedwatchlist_command(),
    ]
}

fn create_addwatchlist_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("addwatchlist")
        .description("Add a movie or series to your watchlist")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("title")
                .description("Title")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(200)
        })
        .create_option(|option| {
            option
                .name("year")
                .description("Release year")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(9)
        })
        .create_option(|option| {
            option
                .name("platform")
                .description("Where to watch (Netflix, cinema, ...)")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(50)
        })
        .create_option(|option| {
            option
                .name("link")
                .description("IMDb or streaming link")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(300)
        })
        .create_option(|option| {
            option
                .name("note")
                .description("Personal note")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(300)
        });
    command
}

fn create_watchlist_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("watchlist")
        .description("Show a movie/series watchlist")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("user")
                .description("See another user's watchlist")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("status")
                .description("Filter by status")
                .kind(CommandOptionType::String)
                .required(false)
                .add_string_choice("open", "open")
                .add_string_choice("done", "done")
        });
    command
}

fn create_completedwatchlist_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("completedwatchlist")
        .description("Mark one of YOUR watchlist items as completed")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("id")
                .description("Item ID (see /watchlist)")
                .kind(CommandOptionType::Integer)
                .required(true)
                .min_int_value(1)
        });
    command
}
