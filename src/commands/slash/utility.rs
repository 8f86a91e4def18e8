//! Utility slash commands: /ping, /echo

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ping_command(), create_echo_command()]
}

fn create_ping_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ping")
        .description("Replies with Pong & latency")
        .to_owned()
}

fn create_echo_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("echo")
        .description("Echo back your message")
        .create_option(|option| {
            option
                .name("text")
                .description("What to echo")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(1900)
        });
    command
}
