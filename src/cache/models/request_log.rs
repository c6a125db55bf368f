use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StoreError;

/// 每个来源保留的最近请求时间戳数量
pub const REQUEST_WINDOW: usize = 100;

/// 单个来源的请求记录
///
/// `timestamps` 只保留最近的一段窗口（旧的在前），
/// `total_count` 是全部请求的累计数，可能大于窗口长度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub source_id: String,
    pub timestamps: Vec<i64>,
    pub last_seen: i64,
    pub total_count: i64,
}

impl RequestRecord {
    pub fn new(source_id: &str, now: i64) -> Self {
        Self {
            source_id: source_id.to_string(),
            timestamps: vec![now],
            last_seen: now,
            total_count: 1,
        }
    }

    /// 追加时间戳，窗口超出上限时先进先出淘汰；计数与 last_seen 由存储层维护
    pub fn push_timestamp(&mut self, now: i64, window: usize) {
        self.timestamps.push(now);
        if self.timestamps.len() > window {
            let overflow = self.timestamps.len() - window;
            self.timestamps.drain(..overflow);
        }
    }
}

/// request_log 表的原始行，timestamps 以 JSON 数组存储
#[derive(Debug, FromRow)]
pub struct RequestRow {
    pub source_id: String,
    pub timestamps: String,
    pub last_seen: i64,
    pub total_count: i64,
}

impl TryFrom<RequestRow> for RequestRecord {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            source_id: row.source_id,
            timestamps: serde_json::from_str(&row.timestamps)?,
            last_seen: row.last_seen,
            total_count: row.total_count,
        })
    }
}

/// 请求汇总
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
pub struct RequestSummary {
    pub total_sources: i64,
    pub total_requests: i64,
}
