use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/heraldbot/config.toml";
const GUILD_DIR_REL_HOME: &str = ".config/heraldbot/guilds";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub announce: AnnounceTemplates,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
    /// Directory holding one TOML record per guild.  Defaults to
    /// `~/.config/heraldbot/guilds`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_config_dir: Option<PathBuf>,
}

/// Built-in announcement templates.  `$user` is replaced with the member's
/// display name and `$mention` with the platform mention syntax.  Voice
/// announcements name the channel being joined or left and are not
/// templated.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnnounceTemplates {
    pub join_message: String,
    pub leave_message: String,
    pub ban_message: String,
}

impl Default for AnnounceTemplates {
    fn default() -> Self {
        Self {
            join_message: "$mention has joined the server.".to_string(),
            leave_message: "**$user** has left the server.".to_string(),
            ban_message: "**$user** has been banned.".to_string(),
        }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(config)
    }

    pub fn guild_config_dir(&self) -> Result<PathBuf> {
        match &self.general.guild_config_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|p| p.join(GUILD_DIR_REL_HOME))
                .ok_or(anyhow!("Could not find home directory")),
        }
    }
}
