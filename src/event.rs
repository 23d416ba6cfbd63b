//! The Serenity crate we're using for the Discord API is designed around
//! callbacks to handle events.  The dispatch engine instead works on a
//! distinct Event enum carrying only the data it routes on, so this module
//! defines that enum plus the light payload types it is built from.

use serenity::all::{ChannelId, GuildId, MessageId, UserId};

/// A platform event, as seen by the router.
pub enum Event {
    Ready {
        bot_name: String,
    },
    Message(MessageEvent),
    MessageEdit(MessageEvent),
    MemberJoined {
        guild_id: GuildId,
        user: UserInfo,
    },
    MemberLeft {
        guild_id: GuildId,
        user: UserInfo,
    },
    MemberBanned {
        guild_id: GuildId,
        user: UserInfo,
    },
    VoiceStateChanged {
        guild_id: GuildId,
        user: UserInfo,
        old: Option<ChannelInfo>,
        new: Option<ChannelInfo>,
    },
    /// The bot joined a guild, or an already-joined guild became available.
    GuildSeen {
        guild_id: GuildId,
    },
    /// The bot left a guild.
    GuildRemoved {
        guild_id: GuildId,
    },
}

/// A received or edited message.
pub struct MessageEvent {
    /// `None` for direct messages, which are not dispatched.
    pub guild_id: Option<GuildId>,
    pub channel: ChannelInfo,
    pub author: UserInfo,
    pub id: MessageId,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub id: UserId,
    /// Guild nickname when known, otherwise the global display name.
    pub name: String,
    pub bot: bool,
}

impl UserInfo {
    pub fn from_user(user: &serenity::all::User) -> Self {
        Self {
            id: user.id,
            name: user
                .global_name
                .clone()
                .unwrap_or_else(|| user.name.clone()),
            bot: user.bot,
        }
    }

    pub fn from_member(member: &serenity::all::Member) -> Self {
        Self {
            id: member.user.id,
            name: member.display_name().to_string(),
            bot: member.user.bot,
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Substitute `$user` and `$mention` in a message template.  Literal
    /// replacement, once per occurrence; templates without placeholders pass
    /// through untouched.
    pub fn render_template(&self, template: &str) -> String {
        template
            .replace("$user", &self.name)
            .replace("$mention", &self.mention())
    }
}
