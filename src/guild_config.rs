//! Per-guild configuration records: the data the cache holds and the store
//! persists.  One record per guild; channel entries are keyed by channel
//! name and carry the stable channel id announcements are delivered to.

use crate::custom::CustomHandler;
use serenity::all::ChannelId;
use std::collections::HashMap;

/// A named event kind a custom handler can bind to, at either guild or
/// channel scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Message,
    Edit,
    Join,
    Leave,
    Ban,
}

/// The four built-in announcement kinds, each gated by one `ChannelConfig`
/// toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnounceKind {
    Join,
    Leave,
    Ban,
    Voice,
}

/// One guild's configuration.  Instances published through the cache are
/// never mutated in place; edits clone, change, and re-save.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GuildConfig {
    #[serde(default)]
    pub channels: HashMap<String, ChannelConfig>,
    #[serde(default)]
    pub hooks: HookSet,
}

/// Configuration for one channel within a guild.  An entry with every toggle
/// off and no handlers bound is permitted but inert; entries are only removed
/// by an explicit save or by delivery-failure eviction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelConfig {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub join_message: bool,
    #[serde(default)]
    pub leave_message: bool,
    #[serde(default)]
    pub ban_message: bool,
    #[serde(default)]
    pub voice_message: bool,
    #[serde(default)]
    pub hooks: HookSet,
}

impl ChannelConfig {
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            join_message: false,
            leave_message: false,
            ban_message: false,
            voice_message: false,
            hooks: HookSet::default(),
        }
    }

    pub fn announces(&self, kind: AnnounceKind) -> bool {
        match kind {
            AnnounceKind::Join => self.join_message,
            AnnounceKind::Leave => self.leave_message,
            AnnounceKind::Ban => self.ban_message,
            AnnounceKind::Voice => self.voice_message,
        }
    }
}

/// The optional custom handler bound to each hook.  Shared shape between
/// guild scope and channel scope.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HookSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_message: Option<CustomHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_edit: Option<CustomHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_join: Option<CustomHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_leave: Option<CustomHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_ban: Option<CustomHandler>,
}

impl HookSet {
    pub fn get(&self, hook: Hook) -> Option<&CustomHandler> {
        match hook {
            Hook::Message => self.on_message.as_ref(),
            Hook::Edit => self.on_edit.as_ref(),
            Hook::Join => self.on_join.as_ref(),
            Hook::Leave => self.on_leave.as_ref(),
            Hook::Ban => self.on_ban.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn persisted_record_shape_parses() {
        let record = r#"
            [hooks.on_join]
            action = "dm"
            content = "welcome, $user"

            [channels.general]
            channel_id = "100"
            join_message = true

            [channels.general.hooks.on_message]
            action = "react"
            emoji = "👀"

            [channels.lobby]
            channel_id = "200"
        "#;

        let config: GuildConfig = toml::from_str(record).unwrap();
        assert_eq!(
            config.hooks.get(Hook::Join),
            Some(&CustomHandler::Dm {
                content: "welcome, $user".to_string()
            })
        );

        let general = &config.channels["general"];
        assert_eq!(general.channel_id, ChannelId::new(100));
        assert!(general.announces(AnnounceKind::Join));
        assert!(!general.announces(AnnounceKind::Voice));
        assert_eq!(
            general.hooks.get(Hook::Message),
            Some(&CustomHandler::React {
                emoji: "👀".to_string()
            })
        );

        // Unset toggles and hooks default off; the entry is inert but kept.
        let lobby = &config.channels["lobby"];
        assert!(!lobby.announces(AnnounceKind::Join));
        assert_eq!(lobby.hooks.get(Hook::Message), None);
    }

    #[test]
    fn record_roundtrips_through_toml() {
        let mut config = GuildConfig::default();
        let mut entry = ChannelConfig::new(ChannelId::new(42));
        entry.ban_message = true;
        entry.hooks.on_leave = Some(CustomHandler::Respond {
            content: "bye $user".to_string(),
        });
        config.channels.insert("mod-log".to_string(), entry);

        let encoded = toml::to_string_pretty(&config).unwrap();
        let decoded: GuildConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
