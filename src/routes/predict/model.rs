use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{FEATURE_COUNT, FEATURE_NAMES},
    error::AppError,
};

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub msg: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictUserForm {
    pub username: Option<String>,
}

/// 用户名表单，同时接受 multipart/form-data 与 application/x-www-form-urlencoded
#[derive(Debug)]
pub struct UsernameForm(pub Option<String>);

impl<S> FromRequest<S> for UsernameForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?
            {
                if field.name() == Some("username") {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidInput(e.body_text()))?;
                    return Ok(Self(Some(value)));
                }
            }
            Ok(Self(None))
        } else {
            let Form(form) = Form::<PredictUserForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            Ok(Self(form.username))
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPrediction {
    pub id: String,
    pub bot_probability: f64,
    pub human_probability: f64,
    pub cached: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub id: String,
    pub bot_probability: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub results: Vec<BatchPrediction>,
}

/// CSV 中的一行：第一列为 ID，其余列按模型顺序为特征
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub id: String,
    pub features: [f64; FEATURE_COUNT],
}

pub fn parse_batch(data: &[u8]) -> Result<Vec<BatchRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // 表头占第 1 行
        let line = idx + 2;
        let record = record
            .map_err(|e| AppError::InvalidInput(format!("CSV 第 {} 行格式错误: {}", line, e)))?;

        if record.len() != FEATURE_COUNT + 1 {
            return Err(AppError::InvalidInput(format!(
                "CSV 第 {} 行应有 {} 列（ID + {} 个特征），实际 {} 列",
                line,
                FEATURE_COUNT + 1,
                FEATURE_COUNT,
                record.len()
            )));
        }

        let mut features = [0.0; FEATURE_COUNT];
        for (i, raw) in record.iter().skip(1).enumerate() {
            features[i] = parse_feature(raw).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "CSV 第 {} 行特征 {} 的值 {:?} 不是数字",
                    line, FEATURE_NAMES[i], raw
                ))
            })?;
        }

        rows.push(BatchRow {
            id: record[0].to_string(),
            features,
        });
    }
    Ok(rows)
}

fn parse_feature(raw: &str) -> Option<f64> {
    if raw.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,default_profile,favourites_count,followers_count,friends_count,geo_enabled,statuses_count,verified,average_tweets_per_day,account_age_days\n";

    #[test]
    fn parses_rows_in_order() {
        let csv = format!(
            "{HEADER}u1,1,10,20,30,0,400,False,1.5,200\nu2, 0 ,0,1,2,1,3,TRUE,0,10\n"
        );
        let rows = parse_batch(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "u1");
        assert_eq!(
            rows[0].features,
            [1.0, 10.0, 20.0, 30.0, 0.0, 400.0, 0.0, 1.5, 200.0]
        );
        assert_eq!(rows[1].features[0], 0.0);
        assert_eq!(rows[1].features[6], 1.0);
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_batch(HEADER.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn wrong_width_and_bad_numbers_are_rejected() {
        let short = format!("{HEADER}u1,1,2,3\n");
        assert!(matches!(
            parse_batch(short.as_bytes()),
            Err(AppError::InvalidInput(_))
        ));

        let bad = format!("{HEADER}u1,1,10,many,30,0,400,0,1.5,200\n");
        let err = parse_batch(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("followers_count"));
    }
}
