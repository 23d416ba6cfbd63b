//! Error taxonomy for the dispatch engine.
//!
//! Failures local to one fan-out target (one channel, one handler) are
//! contained by the caller and never abort sibling work for the same event.
//! Only store failures propagate, since those indicate a real risk of the
//! cache diverging from persisted state.

use serenity::all::{ChannelId, GuildId};
use std::path::PathBuf;

/// The guild-config store is unreachable or rejected an operation.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not read guild record `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write guild record `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not decode guild record `{path}`: {source}")]
    Decode {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not encode guild record: {0}")]
    Encode(#[from] toml::ser::Error),
    #[cfg(test)]
    #[error("injected store failure")]
    Injected,
}

/// A platform action (send, resolve, react, DM) failed on transport or was
/// rejected by the platform.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("discord api error: {0}")]
    Api(#[from] serenity::Error),
}

/// A custom handler could not run: its configuration does not fit the hook
/// it is bound to, or the platform action it performs failed.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("handler needs a channel but the context has none")]
    MissingChannel,
    #[error("handler needs a triggering message but the context has none")]
    MissingMessage,
    #[error("handler needs a triggering user but the context has none")]
    MissingUser,
    #[error("not a usable reaction emoji: `{0}`")]
    InvalidEmoji(String),
    #[error("handler action failed: {0}")]
    Action(#[from] GatewayError),
}

/// One announcement target failed.  Never propagated out of the dispatcher;
/// the variant decides between stale-entry eviction and owner notification.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("channel {channel} no longer exists")]
    ChannelGone { channel: ChannelId },
    #[error("could not resolve channel {channel}: {source}")]
    Resolve {
        channel: ChannelId,
        source: GatewayError,
    },
    #[error("send to channel {channel} rejected: {source}")]
    Rejected {
        channel: ChannelId,
        source: GatewayError,
    },
}

/// The fallback DM to a guild owner failed.  Logged and swallowed.
#[derive(Debug, thiserror::Error)]
#[error("could not notify the owner of guild {guild}: {source}")]
pub struct NotificationError {
    pub guild: GuildId,
    pub source: GatewayError,
}
