use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::{
    AppState,
    classifier::FeatureVector,
    error::{AppError, AppResult},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    BatchPrediction, BatchPredictionResponse, IndexResponse, UserPrediction, UsernameForm,
    parse_batch,
};

#[axum::debug_handler]
pub async fn index() -> Json<ApiResponse<IndexResponse>> {
    success_to_api_response(IndexResponse {
        msg: "This is the test result".to_string(),
    })
}

#[axum::debug_handler(state = AppState)]
pub async fn predict_user(
    State(state): State<AppState>,
    UsernameForm(username): UsernameForm,
) -> AppResult<Json<ApiResponse<UserPrediction>>> {
    let username = username
        .map(|u| u.trim().trim_start_matches('@').to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidInput("缺少用户名".to_string()))?;

    // 先查缓存；缓存不可用时直接重新计算
    match state.cache.lookup(&username).await {
        Ok(Some(entry)) => {
            tracing::debug!("Cache hit for {}", username);
            return Ok(success_to_api_response(UserPrediction {
                id: entry.key,
                bot_probability: entry.bot_probability,
                human_probability: entry.human_probability,
                cached: true,
            }));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache lookup for {} failed, recomputing: {}", username, e),
    }

    let profile = state.profiles.fetch(&username).await?;
    let features = FeatureVector::from_profile(&profile, chrono::Utc::now())?;
    let prediction = state.classifier.predict_proba(&features.to_array())?;

    let bot_probability = prediction.bot_percent();
    let human_probability = prediction.human_percent();

    if let Err(e) = state
        .cache
        .store(&username, bot_probability, human_probability)
        .await
    {
        tracing::warn!("Failed to cache prediction for {}: {}", username, e);
    }

    tracing::info!(
        "Classified {}: bot {:.2}%, human {:.2}%",
        username,
        bot_probability,
        human_probability
    );

    Ok(success_to_api_response(UserPrediction {
        id: username,
        bot_probability,
        human_probability,
        cached: false,
    }))
}

#[axum::debug_handler(state = AppState)]
pub async fn predict_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<BatchPredictionResponse>>> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.body_text()))?
    {
        if field.name() == Some("file") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.body_text()))?,
            );
            break;
        }
    }
    let data = data.ok_or_else(|| AppError::InvalidInput("缺少上传文件 file".to_string()))?;

    let rows = parse_batch(&data)?;
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let prediction = state.classifier.predict_proba(&row.features)?;
        results.push(BatchPrediction {
            id: row.id,
            bot_probability: prediction.bot_percent(),
        });
    }

    tracing::info!("Classified {} rows from CSV upload", results.len());
    Ok(success_to_api_response(BatchPredictionResponse { results }))
}
