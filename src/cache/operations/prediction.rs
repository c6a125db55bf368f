use crate::{
    cache::models::prediction::{CacheEntry, CacheStats},
    database::Store,
    error::StoreError,
    utils::now_timestamp,
};

/// 预测缓存操作
#[derive(Debug, Clone)]
pub struct PredictionCache {
    store: Store,
    expiration_secs: i64,
}

impl PredictionCache {
    pub fn new(store: Store, expiration_secs: i64) -> Self {
        Self {
            store,
            expiration_secs,
        }
    }

    pub fn expiration_secs(&self) -> i64 {
        self.expiration_secs
    }

    /// 获取新鲜的缓存条目，过期条目按未命中处理
    pub async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        self.lookup_at(key, now_timestamp()).await
    }

    pub async fn lookup_at(&self, key: &str, now: i64) -> Result<Option<CacheEntry>, StoreError> {
        let entry = sqlx::query_as::<_, CacheEntry>(
            r#"
            SELECT key, bot_probability, human_probability, cached_at
            FROM prediction_cache
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(self.store.pool())
        .await?;

        match entry {
            Some(entry) if entry.is_fresh(now, self.expiration_secs) => Ok(Some(entry)),
            Some(entry) => {
                tracing::debug!(
                    "Cache entry for {} expired ({}s old)",
                    key,
                    now - entry.cached_at
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// 写入或覆盖缓存条目
    pub async fn store(
        &self,
        key: &str,
        bot_probability: f64,
        human_probability: f64,
    ) -> Result<(), StoreError> {
        self.store_at(key, bot_probability, human_probability, now_timestamp())
            .await
    }

    pub async fn store_at(
        &self,
        key: &str,
        bot_probability: f64,
        human_probability: f64,
        cached_at: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO prediction_cache (key, bot_probability, human_probability, cached_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET
                bot_probability = excluded.bot_probability,
                human_probability = excluded.human_probability,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(key)
        .bind(bot_probability)
        .bind(human_probability)
        .bind(cached_at)
        .execute(self.store.pool())
        .await?;

        tracing::debug!("Cached prediction for {}", key);
        Ok(())
    }

    /// 清空全部缓存，返回删除条数
    pub async fn clear_all(&self) -> Result<u64, StoreError> {
        let removed = sqlx::query("DELETE FROM prediction_cache")
            .execute(self.store.pool())
            .await?
            .rows_affected();

        tracing::info!("Cleared {} cached predictions", removed);
        Ok(removed)
    }

    /// 条目总数与最近写入的 `limit` 条（按 cached_at 降序）
    pub async fn stats(&self, limit: i64) -> Result<CacheStats, StoreError> {
        let mut tx = self.store.pool().begin().await?;

        let (total_entries,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prediction_cache")
            .fetch_one(&mut *tx)
            .await?;

        let recent = sqlx::query_as::<_, CacheEntry>(
            r#"
            SELECT key, bot_probability, human_probability, cached_at
            FROM prediction_cache
            ORDER BY cached_at DESC, key ASC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CacheStats {
            total_entries,
            recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::temp_store;

    const DAY: i64 = 86400;

    async fn cache() -> (PredictionCache, tempfile::TempDir) {
        let (store, dir) = temp_store().await;
        (PredictionCache::new(store, DAY), dir)
    }

    #[tokio::test]
    async fn store_then_lookup_returns_entry() {
        let (cache, _dir) = cache().await;
        cache.store("alice", 80.0, 20.0).await.unwrap();

        let entry = cache.lookup("alice").await.unwrap().unwrap();
        assert_eq!(entry.key, "alice");
        assert_eq!(entry.bot_probability, 80.0);
        assert_eq!(entry.human_probability, 20.0);
    }

    #[tokio::test]
    async fn unknown_key_is_absent() {
        let (cache, _dir) = cache().await;
        assert!(cache.lookup("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let (cache, _dir) = cache().await;
        let now = now_timestamp();

        cache.store_at("old", 10.0, 90.0, now - DAY - 1).await.unwrap();
        cache.store_at("edge", 10.0, 90.0, now - DAY).await.unwrap();

        assert!(cache.lookup_at("old", now).await.unwrap().is_none());
        assert!(cache.lookup_at("edge", now).await.unwrap().is_some());

        // 过期条目不会被删除，仍计入统计
        assert_eq!(cache.stats(10).await.unwrap().total_entries, 2);
    }

    #[tokio::test]
    async fn store_overwrites_previous_entry() {
        let (cache, _dir) = cache().await;
        let now = now_timestamp();

        cache.store_at("carol", 10.0, 90.0, now - DAY * 3).await.unwrap();
        assert!(cache.lookup_at("carol", now).await.unwrap().is_none());

        cache.store_at("carol", 55.5, 44.5, now).await.unwrap();
        let entry = cache.lookup_at("carol", now).await.unwrap().unwrap();
        assert_eq!(entry.bot_probability, 55.5);
        assert_eq!(entry.cached_at, now);
        assert_eq!(cache.stats(10).await.unwrap().total_entries, 1);
    }

    #[tokio::test]
    async fn clear_all_reports_removed_count() {
        let (cache, _dir) = cache().await;
        for key in ["a", "b", "c"] {
            cache.store(key, 50.0, 50.0).await.unwrap();
        }

        assert_eq!(cache.clear_all().await.unwrap(), 3);
        for key in ["a", "b", "c"] {
            assert!(cache.lookup(key).await.unwrap().is_none());
        }
        assert_eq!(cache.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stats_are_bounded_and_newest_first() {
        let (cache, _dir) = cache().await;
        let now = now_timestamp();
        for i in 0..15 {
            cache
                .store_at(&format!("user{i}"), 30.0, 70.0, now - (i * 37) % 500)
                .await
                .unwrap();
        }

        let stats = cache.stats(10).await.unwrap();
        assert_eq!(stats.total_entries, 15);
        assert_eq!(stats.recent.len(), 10);
        assert!(
            stats
                .recent
                .windows(2)
                .all(|w| w[0].cached_at >= w[1].cached_at)
        );
    }
}
