/// 缓存数据模型
// 预测缓存模型
pub mod prediction;

// 请求记录模型
pub mod request_log;

pub use prediction::{CacheEntry, CacheStats, EXPIRATION_SECONDS};
pub use request_log::{REQUEST_WINDOW, RequestRecord, RequestRow, RequestSummary};
