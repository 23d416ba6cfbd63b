use crate::event::{ChannelInfo, MessageEvent, UserInfo};
use crate::gateway::Gateway;
use serenity::all::GuildId;

/// Everything a custom handler can act on for one dispatched event.
///
/// Built fresh per dispatch and owned by the dispatch call that creates it;
/// dropped once every matching handler has run or failed.  The gateway
/// handle is how handlers issue their own platform actions.
pub struct DispatchContext<'a> {
    pub gateway: &'a dyn Gateway,
    pub guild_id: GuildId,
    /// The channel the dispatch is scoped to, when there is one.  Guild-wide
    /// hooks for membership events run with no channel.
    pub channel: Option<ChannelInfo>,
    /// The triggering user: the message author or the joining/leaving/banned
    /// member.
    pub user: Option<UserInfo>,
    /// The triggering message, for message and edit hooks.
    pub message: Option<&'a MessageEvent>,
}
