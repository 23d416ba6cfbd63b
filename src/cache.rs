//! The guild-config cache: the single source of truth dispatch reads from.

use crate::{error::PersistenceError, guild_config::GuildConfig, store::ConfigStore};
use dashmap::DashMap;
use serenity::all::{ChannelId, GuildId};
use std::sync::Arc;

/// In-memory view of every guild's configuration, lazily loaded from the
/// store and written through on save.
///
/// Published configs are immutable: a save publishes a brand-new `Arc`
/// rather than mutating the cached one, so a handler mid-dispatch always
/// reads one consistent snapshot no matter how saves interleave.
pub struct ConfigCache {
    store: Arc<dyn ConfigStore>,
    configs: DashMap<GuildId, Arc<GuildConfig>>,
}

impl ConfigCache {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            configs: DashMap::new(),
        }
    }

    /// The cached config for `guild_id`, loading from the store on a miss
    /// and falling back to an empty default when the store has no record.
    ///
    /// Concurrent misses may each read the store, but the entry API makes
    /// the insert atomic: every racing caller converges on whichever value
    /// was published first.
    pub async fn get(&self, guild_id: GuildId) -> Result<Arc<GuildConfig>, PersistenceError> {
        if let Some(config) = self.configs.get(&guild_id) {
            return Ok(Arc::clone(&config));
        }

        let loaded = self.store.find(guild_id).await?.unwrap_or_default();
        let entry = self
            .configs
            .entry(guild_id)
            .or_insert_with(|| Arc::new(loaded));
        Ok(Arc::clone(&entry))
    }

    /// Write `config` through to the store, then publish it, replacing any
    /// concurrently-loaded stale value.  On store failure nothing is
    /// published and the cache is left unchanged.
    pub async fn save(
        &self,
        guild_id: GuildId,
        config: GuildConfig,
    ) -> Result<Arc<GuildConfig>, PersistenceError> {
        self.store.upsert(guild_id, &config).await?;
        let published = Arc::new(config);
        self.configs.insert(guild_id, Arc::clone(&published));
        Ok(published)
    }

    /// Drop the cached entry, for when the bot leaves a guild.  No-op if
    /// absent.
    pub fn evict(&self, guild_id: GuildId) {
        self.configs.remove(&guild_id);
    }

    /// Drop every channel entry pointing at `channel_id` and persist the
    /// result.  This is the announce dispatcher's stale-entry eviction path.
    pub async fn remove_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<GuildConfig>, PersistenceError> {
        let current = self.get(guild_id).await?;
        let mut next = (*current).clone();
        next.channels
            .retain(|_, entry| entry.channel_id != channel_id);
        self.save(guild_id, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guild_config::ChannelConfig;
    use crate::testutil::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn cache_and_store() -> (Arc<ConfigCache>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let cache = Arc::new(ConfigCache::new(store.clone()));
        (cache, store)
    }

    fn config_with_channel(name: &str, id: u64) -> GuildConfig {
        let mut config = GuildConfig::default();
        config
            .channels
            .insert(name.to_string(), ChannelConfig::new(ChannelId::new(id)));
        config
    }

    #[tokio::test]
    async fn unseen_guild_gets_a_default_loaded_once() {
        let (cache, store) = cache_and_store();
        let guild_id = GuildId::new(1);

        let first = cache.get(guild_id).await.unwrap();
        assert_eq!(*first, GuildConfig::default());

        let second = cache.get(guild_id).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_gets_converge_on_one_instance() {
        let (cache, _store) = cache_and_store();
        let guild_id = GuildId::new(2);

        let a = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(guild_id).await.unwrap() }
        });
        let b = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(guild_id).await.unwrap() }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn save_writes_through_and_publishes() {
        let (cache, store) = cache_and_store();
        let guild_id = GuildId::new(3);
        let config = config_with_channel("general", 10);

        cache.save(guild_id, config.clone()).await.unwrap();

        let cached = cache.get(guild_id).await.unwrap();
        assert_eq!(*cached, config);
        assert_eq!(store.record(guild_id), Some(config));
    }

    #[tokio::test]
    async fn failed_save_leaves_the_cache_unchanged() {
        let (cache, store) = cache_and_store();
        let guild_id = GuildId::new(4);

        let before = cache.get(guild_id).await.unwrap();
        store.fail_upserts.store(true, Ordering::SeqCst);

        let result = cache
            .save(guild_id, config_with_channel("general", 10))
            .await;
        assert!(result.is_err());

        let after = cache.get(guild_id).await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(store.record(guild_id), None);
    }

    #[tokio::test]
    async fn evict_forces_a_reload() {
        let (cache, store) = cache_and_store();
        let guild_id = GuildId::new(5);

        cache.get(guild_id).await.unwrap();
        cache.evict(guild_id);
        cache.get(guild_id).await.unwrap();

        assert_eq!(store.finds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remove_channel_drops_matching_entries_and_persists() {
        let (cache, store) = cache_and_store();
        let guild_id = GuildId::new(6);

        let mut config = config_with_channel("stale", 10);
        config
            .channels
            .insert("live".to_string(), ChannelConfig::new(ChannelId::new(20)));
        cache.save(guild_id, config).await.unwrap();

        let next = cache
            .remove_channel(guild_id, ChannelId::new(10))
            .await
            .unwrap();

        assert!(!next.channels.contains_key("stale"));
        assert!(next.channels.contains_key("live"));
        assert_eq!(store.record(guild_id).unwrap(), *next);
    }
}
