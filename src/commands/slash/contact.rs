//! Contact slash commands: /whois, /setcontact, /clearcontact

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_whois_command(),
        create_setcontact_command(),
        create_clearcontact_command(),
    ]
}

fn create_whois_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("whois")
        .description("Show public info and saved contact of a tagged user")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("user")
                .description("User to inspect")
                .kind(CommandOptionType::User)
                .required(true)
        });
    command
}

fn create_setcontact_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("setcontact")
        .description("Save your phone number, address or display name")
        .create_option(|option| {
            option
                .name("phone")
                .description("Phone number")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(32)
        })
        .create_option(|option| {
            option
                .name("address")
                .description("Address")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(300)
        })
        .create_option(|option| {
            option
                .name("global_name")
                .description("Display name shown on /whois")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(32)
        });
    command
}

fn create_clearcontact_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("clearcontact")
        .description("Delete your saved contact")
        .to_owned()
}
