mod handler;
mod model;

pub use handler::{cache_stats, clear_cache, request_history, user_stats};
pub use model::{CacheStatsResponse, ClearCacheResponse, LimitQuery, UserStatsResponse};
