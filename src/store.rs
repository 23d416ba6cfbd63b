//! Persistent guild-config records.
//!
//! The store owns only the read/write contract; the cache treats it as a
//! keyed collection of `GuildConfig` records.  The file implementation keeps
//! one TOML document per guild and replaces it atomically on save.

use crate::{error::PersistenceError, guild_config::GuildConfig};
use serenity::all::GuildId;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[serenity::async_trait]
pub trait ConfigStore: Send + Sync {
    /// The persisted record for `guild_id`, or `None` if the guild has never
    /// been saved.
    async fn find(&self, guild_id: GuildId) -> Result<Option<GuildConfig>, PersistenceError>;

    /// Insert or replace the record for `guild_id`.
    async fn upsert(
        &self,
        guild_id: GuildId,
        config: &GuildConfig,
    ) -> Result<(), PersistenceError>;
}

/// One TOML record per guild under a base directory.
pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, guild_id: GuildId) -> PathBuf {
        self.dir.join(format!("{}.toml", guild_id))
    }
}

#[serenity::async_trait]
impl ConfigStore for FileConfigStore {
    async fn find(&self, guild_id: GuildId) -> Result<Option<GuildConfig>, PersistenceError> {
        let path = self.record_path(guild_id);

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::Read { path, source: e }),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .await
            .map_err(|e| PersistenceError::Read {
                path: path.clone(),
                source: e,
            })?;

        let config = toml::from_str(&contents)
            .map_err(|e| PersistenceError::Decode { path, source: e })?;

        Ok(Some(config))
    }

    async fn upsert(
        &self,
        guild_id: GuildId,
        config: &GuildConfig,
    ) -> Result<(), PersistenceError> {
        let path = self.record_path(guild_id);
        let record = toml::to_string_pretty(config)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::Write {
                path: self.dir.clone(),
                source: e,
            })?;

        // Write to a temporary file in the same directory, then atomically
        // rename it over the target, so a crash mid-save never leaves a torn
        // record behind.
        let tmp_path = path.with_extension("toml.new");

        tokio::fs::write(&tmp_path, record)
            .await
            .map_err(|e| PersistenceError::Write {
                path: tmp_path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| PersistenceError::Write { path, source: e })
    }
}
