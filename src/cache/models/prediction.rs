use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 缓存条目有效期（秒）
pub const EXPIRATION_SECONDS: i64 = 86400;

/// 预测缓存条目，概率为百分比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CacheEntry {
    pub key: String,
    pub bot_probability: f64,
    pub human_probability: f64,
    pub cached_at: i64, // Unix timestamp
}

impl CacheEntry {
    /// 条目年龄不超过过期窗口时视为新鲜
    pub fn is_fresh(&self, now: i64, expiration_secs: i64) -> bool {
        now - self.cached_at <= expiration_secs
    }
}

/// 缓存统计：总条目数与最近写入的若干条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: i64,
    pub recent: Vec<CacheEntry>,
}
