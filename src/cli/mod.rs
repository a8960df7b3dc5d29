//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod mentions;
pub mod send;
pub mod settings;


use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::mentions::{parse_mention_flag, resolve_mentions};
use crate::cli::send::{run_preview, run_send};
use crate::cli::settings::{set_value, unset_value};
use crate::core::compose::{ComposeRequest, Destination};
use crate::core::config::Config;
use crate::core::mention::schema::mention_schema_document;
use crate::core::mention::RawReferenceInput;
use crate::core::render::MessageFormat;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", ",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "atmention")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Compose channel and chat messages with resolved @mentions")]
#[command(
    long_about = "atmention renders message text, resolves @mentions of users and channels, \
and posts the result with the structured mention list the chat service expects.\n\n\
Mentions:\n\
  Write @token in the text, or @\"token with spaces\" when the token contains spaces.\n\
  Describe each one with --mention 'token=user:<user-id>' or\n\
  --mention 'token=channel:<channel-id>', or pass a JSON list with --mentions-json.\n\n\
Environment Variables:\n\
  GRAPH_ACCESS_TOKEN   Bearer token used for user lookups and posting\n\
  ATMENTION_LOG        Log filter (e.g. 'debug'); defaults to 'warn'"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Log pipeline steps to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a message and post it to a channel or chat
    Send {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        message: MessageArgs,
        /// Print the payload instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Compose a message and print the payload without sending it
    Preview {
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Print the JSON schema accepted by --mentions-json
    Schema,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Team that owns the channel
    #[arg(long, requires = "channel", conflicts_with = "chat")]
    pub team: Option<String>,

    /// Channel to post to (needs --team)
    #[arg(long, requires = "team")]
    pub channel: Option<String>,

    /// Chat to post to
    #[arg(long)]
    pub chat: Option<String>,
}

impl TargetArgs {
    pub fn destination(&self) -> Result<Destination, String> {
        match (&self.team, &self.channel, &self.chat) {
            (Some(team_id), Some(channel_id), None) => Ok(Destination::Channel {
                team_id: team_id.clone(),
                channel_id: channel_id.clone(),
            }),
            (None, None, Some(chat_id)) => Ok(Destination::Chat {
                chat_id: chat_id.clone(),
            }),
            _ => Err("Specify either --team and --channel, or --chat".to_string()),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct MessageArgs {
    /// Message text format: text or markdown
    #[arg(short = 'f', long)]
    pub format: Option<MessageFormat>,

    /// Mention to resolve, as TOKEN=user:ID or TOKEN=channel:ID (repeatable)
    #[arg(short = 'm', long = "mention", value_name = "MENTION", value_parser = parse_mention_flag)]
    pub mentions: Vec<RawReferenceInput>,

    /// JSON file with a list of mentions ('-' reads stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "mentions")]
    pub mentions_json: Option<String>,

    /// Message text
    #[arg(required = true, trailing_var_arg = true)]
    pub text: Vec<String>,
}

impl MessageArgs {
    pub fn into_request(self, config: &Config) -> Result<ComposeRequest, Box<dyn Error>> {
        let format = self.format.unwrap_or_else(|| config.default_format());
        let mentions = resolve_mentions(self.mentions, self.mentions_json.as_deref())?;
        Ok(ComposeRequest::new(self.text.join(" "), format).with_mentions(mentions))
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Send {
            target,
            message,
            dry_run,
        } => {
            let config = Config::load()?;
            let destination = target.destination()?;
            let request = message.into_request(&config)?;
            run_send(&config, destination, request, dry_run).await
        }
        Commands::Preview { message } => {
            let config = Config::load()?;
            let request = message.into_request(&config)?;
            run_preview(&config, request).await
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&mention_schema_document())?);
            Ok(())
        }
        Commands::Set { key, value } => {
            if let Err(err) = set_value(&key, &value) {
                err.print();
                std::process::exit(err.exit_code());
            }
            Ok(())
        }
        Commands::Unset { key } => {
            if let Err(err) = unset_value(&key) {
                err.print();
                std::process::exit(err.exit_code());
            }
            Ok(())
        }
    }
}
