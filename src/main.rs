use anyhow::Context as _;
use serenity::prelude::{Client, GatewayIntents};
use tracing::info;
use tracing_subscriber::EnvFilter;

use giveaway_bot::config::{Config, CONFIG_PATH};
use giveaway_bot::contest::Contest;
use giveaway_bot::handler::Handler;
use giveaway_bot::participants::Participants;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load(CONFIG_PATH).context("failed to load configuration")?;
    info!("booting...");

    let participants = Participants::load(&config.store);
    info!(
        participants = participants.count(),
        store = %config.store.display(),
        "participant store loaded"
    );

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let handler = Handler::new(config.clone(), Contest::new(participants));

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .await
        .context("failed to create the chat client")?;

    info!("connecting to the gateway");
    client.start().await.context("client connection error")?;
    Ok(())
}
