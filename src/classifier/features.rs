use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, profile::AccountProfile};

pub const FEATURE_COUNT: usize = 9;

/// 特征顺序必须与训练模型的列顺序完全一致
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "default_profile",
    "favourites_count",
    "followers_count",
    "friends_count",
    "geo_enabled",
    "statuses_count",
    "verified",
    "average_tweets_per_day",
    "account_age_days",
];

// 上游返回的创建时间格式，例如 "Wed Oct 10 20:19:24 +0000 2018"
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub default_profile: f64,
    pub favourites_count: f64,
    pub followers_count: f64,
    pub friends_count: f64,
    pub geo_enabled: f64,
    pub statuses_count: f64,
    pub verified: f64,
    pub average_tweets_per_day: f64,
    pub account_age_days: f64,
}

impl FeatureVector {
    pub fn from_profile(profile: &AccountProfile, now: DateTime<Utc>) -> Result<Self, AppError> {
        let created_at = DateTime::parse_from_str(&profile.created_at, CREATED_AT_FORMAT)
            .map_err(|e| {
                AppError::FeatureComputation(format!(
                    "无法解析账号创建时间 {:?}: {}",
                    profile.created_at, e
                ))
            })?;

        let account_age_days = (now - created_at.with_timezone(&Utc)).num_days();
        let average_tweets_per_day = if account_age_days > 0 {
            profile.statuses_count as f64 / account_age_days as f64
        } else {
            0.0
        };

        Ok(Self {
            default_profile: flag(profile.default_profile),
            favourites_count: profile.favourites_count as f64,
            followers_count: profile.followers_count as f64,
            friends_count: profile.friends_count as f64,
            geo_enabled: flag(profile.location.as_deref().is_some_and(|l| !l.trim().is_empty())),
            statuses_count: profile.statuses_count as f64,
            verified: flag(profile.verified),
            average_tweets_per_day,
            account_age_days: account_age_days as f64,
        })
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.default_profile,
            self.favourites_count,
            self.followers_count,
            self.friends_count,
            self.geo_enabled,
            self.statuses_count,
            self.verified,
            self.average_tweets_per_day,
            self.account_age_days,
        ]
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
