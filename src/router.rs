//! Routes every inbound platform event to the matching guild- and
//! channel-scope handlers, with per-handler failure containment.

use crate::{
    announce::AnnounceDispatcher,
    cache::ConfigCache,
    config::AnnounceTemplates,
    context::DispatchContext,
    custom::CustomHandler,
    event::{Event, MessageEvent, UserInfo},
    gateway::Gateway,
    guild_config::Hook,
    log_error, log_event, log_internal,
    logging::Color,
};
use serenity::all::GuildId;
use std::sync::Arc;

/// The single subscription point for dispatch.  Constructed once at startup
/// with explicit references to its collaborators; there is no hidden
/// registration list.
pub struct EventRouter {
    cache: Arc<ConfigCache>,
    announcer: AnnounceDispatcher,
}

impl EventRouter {
    pub fn new(cache: Arc<ConfigCache>, templates: AnnounceTemplates) -> Self {
        let announcer = AnnounceDispatcher::new(Arc::clone(&cache), templates);
        Self { cache, announcer }
    }

    pub async fn dispatch(&self, gateway: &dyn Gateway, event: Event) {
        match event {
            Event::Ready { bot_name } => {
                log_event!("Connected as {}{}{}", Color::User, bot_name, Color::Default);
            }
            Event::GuildSeen { guild_id } => {
                // Warm the cache so the first real event doesn't pay the
                // store round-trip.
                match self.cache.get(guild_id).await {
                    Ok(_) => log_internal!(
                        "Loaded config for guild {}{}{}",
                        Color::Guild,
                        guild_id,
                        Color::Default,
                    ),
                    Err(err) => log_error!(
                        "Could not load config for guild {}{}{}: {}",
                        Color::Guild,
                        guild_id,
                        Color::Default,
                        err
                    ),
                }
            }
            Event::GuildRemoved { guild_id } => self.cache.evict(guild_id),
            Event::Message(msg) => self.dispatch_message(gateway, Hook::Message, &msg).await,
            Event::MessageEdit(msg) => self.dispatch_message(gateway, Hook::Edit, &msg).await,
            Event::MemberJoined { guild_id, user } => {
                self.dispatch_user_event(gateway, Hook::Join, guild_id, &user)
                    .await;
                self.announcer.member_joined(gateway, guild_id, &user).await;
            }
            Event::MemberLeft { guild_id, user } => {
                self.dispatch_user_event(gateway, Hook::Leave, guild_id, &user)
                    .await;
                self.announcer.member_left(gateway, guild_id, &user).await;
            }
            Event::MemberBanned { guild_id, user } => {
                self.dispatch_user_event(gateway, Hook::Ban, guild_id, &user)
                    .await;
                self.announcer.member_banned(gateway, guild_id, &user).await;
            }
            Event::VoiceStateChanged {
                guild_id,
                user,
                old,
                new,
            } => {
                self.announcer
                    .voice_state_changed(gateway, guild_id, &user, old.as_ref(), new.as_ref())
                    .await;
            }
        }
    }

    /// Guild-scope hook first, then the hook of the channel the message was
    /// posted in; both may run for the same event.  Messages from bots and
    /// direct messages are not dispatched.
    async fn dispatch_message(&self, gateway: &dyn Gateway, hook: Hook, msg: &MessageEvent) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let config = match self.cache.get(guild_id).await {
            Ok(config) => config,
            Err(err) => {
                log_error!(
                    "Could not load config for guild {}{}{}: {}",
                    Color::Guild,
                    guild_id,
                    Color::Default,
                    err
                );
                return;
            }
        };

        let ctx = DispatchContext {
            gateway,
            guild_id,
            channel: Some(msg.channel.clone()),
            user: Some(msg.author.clone()),
            message: Some(msg),
        };

        if let Some(handler) = config.hooks.get(hook) {
            run_handler(handler, &ctx, "guild").await;
        }
        if let Some(entry) = config.channels.get(&msg.channel.name) {
            if let Some(handler) = entry.hooks.get(hook) {
                run_handler(handler, &ctx, "channel").await;
            }
        }
    }

    /// Guild-scope hook with a channel-less context, then one invocation per
    /// configured channel whose handler is bound.  Channels are resolved at
    /// dispatch time; ones that no longer resolve are skipped silently.
    /// Stale-entry eviction is the announce path's job, since only a
    /// platform write makes staleness observable.
    async fn dispatch_user_event(
        &self,
        gateway: &dyn Gateway,
        hook: Hook,
        guild_id: GuildId,
        user: &UserInfo,
    ) {
        let config = match self.cache.get(guild_id).await {
            Ok(config) => config,
            Err(err) => {
                log_error!(
                    "Could not load config for guild {}{}{}: {}",
                    Color::Guild,
                    guild_id,
                    Color::Default,
                    err
                );
                return;
            }
        };

        let guild_ctx = DispatchContext {
            gateway,
            guild_id,
            channel: None,
            user: Some(user.clone()),
            message: None,
        };
        if let Some(handler) = config.hooks.get(hook) {
            run_handler(handler, &guild_ctx, "guild").await;
        }

        for (name, entry) in &config.channels {
            let Some(handler) = entry.hooks.get(hook) else {
                continue;
            };
            let channel = match gateway.text_channel_by_name(guild_id, name).await {
                Ok(Some(channel)) => channel,
                Ok(None) => continue,
                Err(err) => {
                    log_error!(
                        "Could not resolve channel {}{}{} in guild {}{}{}: {}",
                        Color::Channel,
                        name,
                        Color::Default,
                        Color::Guild,
                        guild_id,
                        Color::Default,
                        err
                    );
                    continue;
                }
            };
            let ctx = DispatchContext {
                gateway,
                guild_id,
                channel: Some(channel),
                user: Some(user.clone()),
                message: None,
            };
            run_handler(handler, &ctx, "channel").await;
        }
    }
}

// A handler's failure is its own; log it and keep dispatching.
async fn run_handler(handler: &CustomHandler, ctx: &DispatchContext<'_>, scope: &str) {
    if let Err(err) = handler.process_event(ctx).await {
        log_error!(
            "{}-scope handler failed in guild {}{}{}: {}",
            scope,
            Color::Guild,
            ctx.guild_id,
            Color::Default,
            err
        );
    }
}
