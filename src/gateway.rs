//! Boundary trait for the platform actions the dispatch engine performs,
//! plus the production implementation over the Serenity context.

use crate::{error::GatewayError, event::ChannelInfo};
use serenity::all::{
    ChannelId, ChannelType, CreateMessage, GuildId, MessageId, ReactionType, UserId,
};

#[serenity::async_trait]
pub trait Gateway: Send + Sync {
    /// Resolve a live text channel by its stored id.  `Ok(None)` means the
    /// channel no longer exists, as opposed to a transport failure.
    async fn text_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelInfo>, GatewayError>;

    /// Resolve a live text channel by name, the key channel entries are
    /// configured under.
    async fn text_channel_by_name(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelInfo>, GatewayError>;

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), GatewayError>;

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<(), GatewayError>;

    async fn dm_user(&self, user_id: UserId, content: &str) -> Result<(), GatewayError>;

    async fn guild_owner(&self, guild_id: GuildId) -> Result<UserId, GatewayError>;
}

/// `Gateway` over a live Serenity connection.  Constructed per event from
/// the callback's context.
pub struct SerenityGateway<'a> {
    ctx: &'a serenity::all::Context,
}

impl<'a> SerenityGateway<'a> {
    pub fn new(ctx: &'a serenity::all::Context) -> Self {
        Self { ctx }
    }
}

#[serenity::async_trait]
impl Gateway for SerenityGateway<'_> {
    async fn text_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelInfo>, GatewayError> {
        let channels = guild_id.channels(&self.ctx.http).await?;
        Ok(channels
            .get(&channel_id)
            .filter(|channel| channel.kind == ChannelType::Text)
            .map(|channel| ChannelInfo {
                id: channel.id,
                name: channel.name.clone(),
            }))
    }

    async fn text_channel_by_name(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelInfo>, GatewayError> {
        let channels = guild_id.channels(&self.ctx.http).await?;
        Ok(channels
            .values()
            .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
            .map(|channel| ChannelInfo {
                id: channel.id,
                name: channel.name.clone(),
            }))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), GatewayError> {
        channel_id.say(self.ctx, content).await?;
        Ok(())
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<(), GatewayError> {
        self.ctx
            .http
            .create_reaction(channel_id, message_id, &reaction)
            .await?;
        Ok(())
    }

    async fn dm_user(&self, user_id: UserId, content: &str) -> Result<(), GatewayError> {
        let user = user_id.to_user(self.ctx).await?;
        user.direct_message(self.ctx, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn guild_owner(&self, guild_id: GuildId) -> Result<UserId, GatewayError> {
        Ok(guild_id.to_partial_guild(self.ctx).await?.owner_id)
    }
}
