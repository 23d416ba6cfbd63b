mod announce;
mod cache;
mod config;
mod context;
mod custom;
mod error;
mod event;
mod gateway;
mod guild_config;
mod handler;
mod logging;
mod router;
mod store;
#[cfg(test)]
mod testutil;

use serenity::{all::GatewayIntents, Client};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = crate::config::Config::load().await?;
    let token = cfg.general.discord_token.clone();

    // Explicit wiring: store feeds cache, cache feeds router, router feeds
    // the platform handler.
    let store = Arc::new(store::FileConfigStore::new(cfg.guild_config_dir()?));
    let cache = Arc::new(cache::ConfigCache::new(store));
    let router = router::EventRouter::new(cache, cfg.announce.clone());
    let handler = handler::Handler::new(router);

    // Things we want discord to tell us about.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MODERATION
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(&token, intents)
        .event_handler(handler)
        .await?
        .start()
        .await
        .map_err(Into::into)
}
