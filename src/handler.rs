use crate::{
    event::{ChannelInfo, Event, MessageEvent, UserInfo},
    gateway::SerenityGateway,
    router::EventRouter,
};
use serenity::all::{
    ChannelId, Guild, GuildId, Member, Message, MessageUpdateEvent, Ready, UnavailableGuild, User,
    VoiceState,
};

/// Discord event handler: the single subscription point.  Each callback is
/// translated into an `Event` and pushed through the router together with a
/// gateway over the callback's context.
pub struct Handler {
    router: EventRouter,
}

impl Handler {
    pub fn new(router: EventRouter) -> Self {
        Self { router }
    }

    async fn dispatch(&self, discord_ctx: &serenity::all::Context, event: Event) {
        let gateway = SerenityGateway::new(discord_ctx);
        self.router.dispatch(&gateway, event).await;
    }

    async fn message_event(
        &self,
        discord_ctx: &serenity::all::Context,
        msg: &Message,
    ) -> Option<MessageEvent> {
        // Channel names are the configuration key, so resolve one per
        // message; serenity answers from cache when it can.
        let name = msg.channel_id.name(discord_ctx).await.ok()?;
        Some(MessageEvent {
            guild_id: msg.guild_id,
            channel: ChannelInfo {
                id: msg.channel_id,
                name,
            },
            author: UserInfo::from_user(&msg.author),
            id: msg.id,
            content: msg.content.clone(),
        })
    }

    async fn voice_channel(
        &self,
        discord_ctx: &serenity::all::Context,
        channel_id: Option<ChannelId>,
    ) -> Option<ChannelInfo> {
        let id = channel_id?;
        let name = id.name(discord_ctx).await.ok()?;
        Some(ChannelInfo { id, name })
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        let event = Event::Ready {
            bot_name: ready.user.name.clone(),
        };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        let Some(event) = self.message_event(&discord_ctx, &msg).await else {
            return;
        };
        self.dispatch(&discord_ctx, Event::Message(event)).await;
    }

    async fn message_update(
        &self,
        discord_ctx: serenity::all::Context,
        _old_if_available: Option<Message>,
        new: Option<Message>,
        _event: MessageUpdateEvent,
    ) {
        // Without the full updated message there is no content to hand to a
        // handler.
        let Some(msg) = new else {
            return;
        };
        let Some(event) = self.message_event(&discord_ctx, &msg).await else {
            return;
        };
        self.dispatch(&discord_ctx, Event::MessageEdit(event)).await;
    }

    async fn guild_create(
        &self,
        discord_ctx: serenity::all::Context,
        guild: Guild,
        _is_new: Option<bool>,
    ) {
        let event = Event::GuildSeen { guild_id: guild.id };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn guild_delete(
        &self,
        discord_ctx: serenity::all::Context,
        incomplete: UnavailableGuild,
        _full: Option<Guild>,
    ) {
        // An unavailable guild is an outage, not a departure; keep its
        // config cached.
        if incomplete.unavailable {
            return;
        }
        let event = Event::GuildRemoved {
            guild_id: incomplete.id,
        };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn guild_member_addition(&self, discord_ctx: serenity::all::Context, member: Member) {
        let event = Event::MemberJoined {
            guild_id: member.guild_id,
            user: UserInfo::from_member(&member),
        };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn guild_member_removal(
        &self,
        discord_ctx: serenity::all::Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        let event = Event::MemberLeft {
            guild_id,
            user: UserInfo::from_user(&user),
        };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn guild_ban_addition(
        &self,
        discord_ctx: serenity::all::Context,
        guild_id: GuildId,
        banned_user: User,
    ) {
        let event = Event::MemberBanned {
            guild_id,
            user: UserInfo::from_user(&banned_user),
        };
        self.dispatch(&discord_ctx, event).await;
    }

    async fn voice_state_update(
        &self,
        discord_ctx: serenity::all::Context,
        old: Option<VoiceState>,
        new: VoiceState,
    ) {
        let Some(guild_id) = new.guild_id else {
            return;
        };

        let user = match &new.member {
            Some(member) => UserInfo::from_member(member),
            None => match new.user_id.to_user(&discord_ctx).await {
                Ok(user) => UserInfo::from_user(&user),
                Err(_) => return,
            },
        };

        let old_channel = self
            .voice_channel(&discord_ctx, old.as_ref().and_then(|o| o.channel_id))
            .await;
        let new_channel = self.voice_channel(&discord_ctx, new.channel_id).await;

        let event = Event::VoiceStateChanged {
            guild_id,
            user,
            old: old_channel,
            new: new_channel,
        };
        self.dispatch(&discord_ctx, event).await;
    }
}
