//! Built-in join/leave/ban/voice announcements.
//!
//! One triggering event fans out to every channel whose toggle for that
//! kind is on.  Delivery failures are classified per channel: a channel
//! that no longer exists is evicted from the guild's persisted config, a
//! channel that rejects the send is kept and the guild owner is DM'd so a
//! human can fix permissions.  One channel's failure never aborts the rest
//! of the fan-out.

use crate::{
    cache::ConfigCache,
    config::AnnounceTemplates,
    error::{DeliveryError, NotificationError},
    event::{ChannelInfo, UserInfo},
    gateway::Gateway,
    guild_config::AnnounceKind,
    log_error, log_event, log_internal,
    logging::Color,
};
use serenity::all::{ChannelId, GuildId};
use std::sync::Arc;

pub struct AnnounceDispatcher {
    cache: Arc<ConfigCache>,
    templates: AnnounceTemplates,
}

impl AnnounceDispatcher {
    pub fn new(cache: Arc<ConfigCache>, templates: AnnounceTemplates) -> Self {
        Self { cache, templates }
    }

    pub async fn member_joined(&self, gateway: &dyn Gateway, guild_id: GuildId, user: &UserInfo) {
        let message = user.render_template(&self.templates.join_message);
        self.fan_out(gateway, guild_id, AnnounceKind::Join, &message)
            .await;
    }

    pub async fn member_left(&self, gateway: &dyn Gateway, guild_id: GuildId, user: &UserInfo) {
        let message = user.render_template(&self.templates.leave_message);
        self.fan_out(gateway, guild_id, AnnounceKind::Leave, &message)
            .await;
    }

    pub async fn member_banned(&self, gateway: &dyn Gateway, guild_id: GuildId, user: &UserInfo) {
        let message = user.render_template(&self.templates.ban_message);
        self.fan_out(gateway, guild_id, AnnounceKind::Ban, &message)
            .await;
    }

    /// Announce a voice-channel change.  Only an actual channel change is
    /// announced; mute/deafen toggles arrive with the same channel id on
    /// both sides and stay silent.
    pub async fn voice_state_changed(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        user: &UserInfo,
        old: Option<&ChannelInfo>,
        new: Option<&ChannelInfo>,
    ) {
        if old.map(|c| c.id) == new.map(|c| c.id) {
            return;
        }

        let message = match (old, new) {
            (_, Some(joined)) => format!("**{}** joined **{}**", user.name, joined.name),
            (Some(left), None) => format!("**{}** left **{}**", user.name, left.name),
            (None, None) => return,
        };

        self.fan_out(gateway, guild_id, AnnounceKind::Voice, &message)
            .await;
    }

    async fn fan_out(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        kind: AnnounceKind,
        message: &str,
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

        // Snapshot the targets up front so stale-entry eviction below cannot
        // invalidate the walk.
        let targets: Vec<(String, ChannelId)> = config
            .channels
            .iter()
            .filter(|(_, entry)| entry.announces(kind))
            .map(|(name, entry)| (name.clone(), entry.channel_id))
            .collect();

        for (name, channel_id) in targets {
            match self.deliver(gateway, guild_id, channel_id, message).await {
                Ok(()) => {}
                Err(DeliveryError::ChannelGone { .. }) => {
                    log_event!(
                        "Announcement channel {}{}{} is gone; dropping it from guild {}{}{}",
                        Color::Channel,
                        name,
                        Color::Default,
                        Color::Guild,
                        guild_id,
                        Color::Default,
                    );
                    if let Err(err) = self.cache.remove_channel(guild_id, channel_id).await {
                        log_error!(
                            "Could not persist removal of channel {}: {}",
                            channel_id,
                            err
                        );
                    }
                }
                Err(DeliveryError::Resolve { source, .. }) => {
                    // Cannot tell a stale entry from an outage; keep the
                    // entry and move on.
                    log_error!(
                        "Could not resolve announcement channel {}{}{}: {}",
                        Color::Channel,
                        name,
                        Color::Default,
                        source
                    );
                }
                Err(err @ DeliveryError::Rejected { .. }) => {
                    log_error!(
                        "Announcement \"{}\" failed: {}. Notifying guild owner.",
                        message,
                        err
                    );
                    match self.notify_owner(gateway, guild_id, channel_id, message).await {
                        Ok(()) => log_internal!(
                            "Notified the owner of guild {}{}{}",
                            Color::Guild,
                            guild_id,
                            Color::Default,
                        ),
                        // Best effort only.
                        Err(err) => log_error!("{}", err),
                    }
                }
            }
        }
    }

    async fn deliver(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        channel_id: ChannelId,
        message: &str,
    ) -> Result<(), DeliveryError> {
        let channel = match gateway.text_channel(guild_id, channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                return Err(DeliveryError::ChannelGone {
                    channel: channel_id,
                })
            }
            Err(source) => {
                return Err(DeliveryError::Resolve {
                    channel: channel_id,
                    source,
                })
            }
        };

        gateway
            .send_message(channel.id, message)
            .await
            .map_err(|source| DeliveryError::Rejected {
                channel: channel_id,
                source,
            })
    }

    async fn notify_owner(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        channel_id: ChannelId,
        message: &str,
    ) -> Result<(), NotificationError> {
        let owner = gateway
            .guild_owner(guild_id)
            .await
            .map_err(|source| NotificationError {
                guild: guild_id,
                source,
            })?;

        let notice = format!(
            "There was an attempt to announce something in channel <#{}> that failed. \
             The announcement was \"{}\". Please make sure the bot has permission to \
             send messages there, or disable the feature in that channel.",
            channel_id, message
        );

        gateway
            .dm_user(owner, &notice)
            .await
            .map_err(|source| NotificationError {
                guild: guild_id,
                source,
            })
    }
}
