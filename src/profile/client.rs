use async_trait::async_trait;
use serde_json::Value;

use super::{AccountProfile, ProfileSource};
use crate::{config::Config, error::AppError};

/// RapidAPI twitter241 `/user` 接口
#[derive(Debug, Clone)]
pub struct RapidApiProfileSource {
    http: reqwest::Client,
    url: String,
    host: String,
    api_key: String,
}

impl RapidApiProfileSource {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.profile_api_timeout())
            .build()?;

        Ok(Self {
            http,
            url: config.profile_api_url.clone(),
            host: config.profile_api_host.clone(),
            api_key: config.rapid_api_key.clone(),
        })
    }
}

#[async_trait]
impl ProfileSource for RapidApiProfileSource {
    async fn fetch(&self, username: &str) -> Result<AccountProfile, AppError> {
        tracing::debug!("Fetching profile for {}", username);

        let body: Value = self
            .http
            .get(&self.url)
            .query(&[("username", username)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::UpstreamFailure(format!("获取用户数据失败: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("获取用户数据失败: {}", e)))?;

        parse_profile(&body)
    }
}

/// 账号信息位于 `result.data.user.result.legacy`
pub(crate) fn parse_profile(body: &Value) -> Result<AccountProfile, AppError> {
    let user = body
        .get("result")
        .ok_or_else(|| AppError::UpstreamFailure("获取用户数据失败: 响应缺少 result".into()))?
        .pointer("/data/user")
        .ok_or_else(|| AppError::UpstreamFailure("解析用户数据失败: 缺少 data.user".into()))?;

    let Some(result) = user.get("result") else {
        return Err(AppError::NotFound("用户数据不存在".into()));
    };

    let legacy = result
        .get("legacy")
        .cloned()
        .ok_or_else(|| AppError::UpstreamFailure("解析用户数据失败: 缺少 legacy".into()))?;

    serde_json::from_value(legacy)
        .map_err(|e| AppError::UpstreamFailure(format!("解析用户数据失败: {}", e)))
}
