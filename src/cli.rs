use clap::{Parser, Subcommand};
use inquire::Text;

use crate::config::DispatchConfig;
use crate::handlers::responder::ConsoleResponder;
use crate::models::message::IncomingMessage;
use crate::models::payload::render_iso8601;
use crate::runtime::build_dispatcher;
use crate::service::date_parser::{DateTimeParser, NaturalDateParser};

const CLI_CHAT_ID: &str = "cli";

#[derive(Parser)]
#[command(about = "Send calendar events to the webhook without going through Telegram")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one message exactly as the bot would
    Send { text: String },
    /// Ask for the message interactively, then dispatch it
    Prompt {},
    /// Only show the date/time that would be extracted
    Parse { text: String },
}

pub async fn cli(config: DispatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Fine to exit on bad arguments here
    let cli = Cli::parse();
    match cli.command {
        Commands::Send { text } => send(&config, text).await,
        Commands::Prompt {} => {
            let text = specify_prompt()?;
            send(&config, text).await
        }
        Commands::Parse { text } => {
            let parser = NaturalDateParser::new(config.timezone);
            match parser.parse(&text) {
                Some(datetime) => println!("{}", render_iso8601(&datetime)),
                None => println!("No date/time found"),
            }
            Ok(())
        }
    }
}

async fn send(config: &DispatchConfig, text: String) -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = build_dispatcher(config)?;
    let message = IncomingMessage::new(CLI_CHAT_ID, text);
    dispatcher.handle(&ConsoleResponder, &message).await;
    Ok(())
}

fn specify_prompt() -> Result<String, Box<dyn std::error::Error>> {
    Ok(Text::new("Describe your calendar event.").prompt()?)
}
