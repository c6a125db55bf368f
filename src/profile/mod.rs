// 用户资料查询模块
// 通过第三方接口按用户名获取账号元数据，用于构建特征向量

mod client;

pub use client::RapidApiProfileSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 构建特征所需的账号元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub favourites_count: u64,
    pub followers_count: u64,
    pub friends_count: u64,
    pub statuses_count: u64,
    pub verified: bool,
    pub created_at: String,
    pub default_profile: bool,
    // 上游可能缺少该字段，也可能给出 null
    #[serde(default)]
    pub location: Option<String>,
}

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, username: &str) -> Result<AccountProfile, AppError>;
}
