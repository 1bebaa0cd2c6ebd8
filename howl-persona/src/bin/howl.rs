//! `howl` — run the persona engine against chat history stored as JSON.
//!
//! ```text
//! howl --config howl.toml --messages history.json --context event.json context
//! howl --config howl.toml --messages history.json --context event.json respond
//! howl --config howl.toml --messages history.json --context event.json action eat
//! howl --messages history.json --context event.json vision https://example.com/wolf.png
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use howl_core::{HowlConfig, Message, RequesterContext};
use howl_persona::telemetry::init_tracing;
use howl_persona::{PersonaEngine, StaticMessageSource};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "howl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HOWL persona engine - build context, reply, and act from JSON chat history")]
struct Args {
    /// Configuration file; defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON array of messages in the channel, oldest first
    #[arg(long, value_name = "PATH")]
    messages: PathBuf,

    /// JSON requester context describing the triggering event
    #[arg(long, value_name = "PATH")]
    context: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the assembled conversation payload
    Context,
    /// Generate an in-character reply
    Respond,
    /// Resolve an action (eat, drink, alcohol)
    Action {
        /// Action name
        name: String,
        /// Use this item instead of a random draw
        #[arg(long)]
        item: Option<String>,
    },
    /// Rate the tone of the triggering message
    Mood,
    /// Ask about an image; the question defaults to the triggering message
    Vision {
        /// Publicly reachable image URL
        image_url: String,
        #[arg(long)]
        text: Option<String>,
    },
}

#[derive(Serialize)]
struct ActionOutput<'a> {
    #[serde(flatten)]
    reply: &'a howl_persona::ActionReply,
    needs: howl_core::NeedSnapshot,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HowlConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => HowlConfig::default(),
    }
    .with_env_overrides();
    init_tracing(&config.general);

    let messages: Vec<Message> = read_json(&args.messages)?;
    let ctx: RequesterContext = read_json(&args.context)?;
    info!(messages = messages.len(), channel = %ctx.channel.id, "history loaded");

    let source = StaticMessageSource::new();
    source.set_scope(ctx.channel.id.clone(), messages);
    let engine = PersonaEngine::with_router(config, Arc::new(source))?;

    match args.command {
        Command::Context => {
            let conversation = engine.build_conversation(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(conversation.messages())?);
        }
        Command::Respond => {
            println!("{}", engine.respond(&ctx).await?);
        }
        Command::Action { name, item } => {
            let reply = match item {
                Some(item) => {
                    engine
                        .resolve_action_with_item(name.parse()?, &item, &ctx)
                        .await?
                }
                None => engine.resolve_action(&name, &ctx).await?,
            };
            let output = ActionOutput {
                reply: &reply,
                needs: engine.needs().snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Mood => {
            println!("{}", engine.mood_temperature(&ctx).await?);
        }
        Command::Vision { image_url, text } => {
            let question = text.as_deref().unwrap_or(&ctx.content);
            println!("{}", engine.generate_vision(&image_url, question).await?);
        }
    }
    Ok(())
}
