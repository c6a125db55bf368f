// 缓存模块
// 预测结果缓存与按来源的请求记录，均落在本地数据库中

pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use models::{
    CacheEntry, CacheStats, EXPIRATION_SECONDS, REQUEST_WINDOW, RequestRecord, RequestSummary,
};
pub use operations::{PredictionCache, RequestLedger};
