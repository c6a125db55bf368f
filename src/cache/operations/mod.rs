/// 缓存操作
/// 提供缓存操作的功能实现

// 预测缓存操作
pub mod prediction;

// 请求记录操作
pub mod request_log;

pub use prediction::PredictionCache;
pub use request_log::RequestLedger;
