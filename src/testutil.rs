//! In-memory collaborators for the unit tests: a config store with failure
//! injection and a recording gateway.

use crate::{
    error::{GatewayError, PersistenceError},
    event::ChannelInfo,
    gateway::Gateway,
    guild_config::GuildConfig,
    store::ConfigStore,
};
use serenity::all::{ChannelId, GuildId, MessageId, ReactionType, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<GuildId, GuildConfig>>,
    /// Number of `find` calls, for no-duplicate-load assertions.
    pub finds: AtomicUsize,
    pub fail_upserts: AtomicBool,
}

impl MemoryStore {
    pub fn record(&self, guild_id: GuildId) -> Option<GuildConfig> {
        self.records.lock().unwrap().get(&guild_id).cloned()
    }
}

#[serenity::async_trait]
impl ConfigStore for MemoryStore {
    async fn find(&self, guild_id: GuildId) -> Result<Option<GuildConfig>, PersistenceError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().get(&guild_id).cloned())
    }

    async fn upsert(
        &self,
        guild_id: GuildId,
        config: &GuildConfig,
    ) -> Result<(), PersistenceError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(PersistenceError::Injected);
        }
        self.records
            .lock()
            .unwrap()
            .insert(guild_id, config.clone());
        Ok(())
    }
}

/// One recorded platform action.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Send {
        channel: ChannelId,
        content: String,
    },
    React {
        channel: ChannelId,
        message: MessageId,
        emoji: String,
    },
    Dm {
        user: UserId,
        content: String,
    },
}

#[derive(Default)]
pub struct FakeGateway {
    /// Live text channels, by guild.
    channels: Mutex<Vec<(GuildId, ChannelInfo)>>,
    /// Channels that exist but reject sends.
    rejecting: Mutex<Vec<ChannelId>>,
    owners: Mutex<HashMap<GuildId, UserId>>,
    pub fail_dms: AtomicBool,
    actions: Mutex<Vec<Action>>,
}

impl FakeGateway {
    pub fn add_channel(&self, guild_id: GuildId, id: ChannelId, name: &str) {
        self.channels.lock().unwrap().push((
            guild_id,
            ChannelInfo {
                id,
                name: name.to_string(),
            },
        ));
    }

    pub fn reject_sends(&self, id: ChannelId) {
        self.rejecting.lock().unwrap().push(id);
    }

    pub fn set_owner(&self, guild_id: GuildId, user_id: UserId) {
        self.owners.lock().unwrap().insert(guild_id, user_id);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<(ChannelId, String)> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Send { channel, content } => Some((channel, content)),
                _ => None,
            })
            .collect()
    }

    pub fn dms(&self) -> Vec<(UserId, String)> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Dm { user, content } => Some((user, content)),
                _ => None,
            })
            .collect()
    }
}

#[serenity::async_trait]
impl Gateway for FakeGateway {
    async fn text_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelInfo>, GatewayError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|(guild, channel)| *guild == guild_id && channel.id == channel_id)
            .map(|(_, channel)| channel.clone()))
    }

    async fn text_channel_by_name(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelInfo>, GatewayError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|(guild, channel)| *guild == guild_id && channel.name == name)
            .map(|(_, channel)| channel.clone()))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), GatewayError> {
        if self.rejecting.lock().unwrap().contains(&channel_id) {
            return Err(GatewayError::Api(serenity::Error::Other("send rejected")));
        }
        self.actions.lock().unwrap().push(Action::Send {
            channel: channel_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<(), GatewayError> {
        self.actions.lock().unwrap().push(Action::React {
            channel: channel_id,
            message: message_id,
            emoji: reaction.to_string(),
        });
        Ok(())
    }

    async fn dm_user(&self, user_id: UserId, content: &str) -> Result<(), GatewayError> {
        if self.fail_dms.load(Ordering::SeqCst) {
            return Err(GatewayError::Api(serenity::Error::Other("dm rejected")));
        }
        self.actions.lock().unwrap().push(Action::Dm {
            user: user_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn guild_owner(&self, guild_id: GuildId) -> Result<UserId, GatewayError> {
        self.owners
            .lock()
            .unwrap()
            .get(&guild_id)
            .copied()
            .ok_or(GatewayError::Api(serenity::Error::Other("no owner")))
    }
}
