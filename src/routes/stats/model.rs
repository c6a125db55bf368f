use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, RequestRecord};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// 默认 10 条，限制在 1..=100
    pub fn resolve(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub total_entries: i64,
    pub expiration_secs: i64,
    pub recent: Vec<CacheEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub total_sources: i64,
    pub total_requests: i64,
    pub top_sources: Vec<RequestRecord>,
    pub recent_sources: Vec<RequestRecord>,
}
