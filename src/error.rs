use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 存储层不可用（连接、事务或记录解码失败），与“未找到”区分开
#[derive(Debug, thiserror::Error)]
#[error("storage unavailable: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError(sqlx::Error::Decode(Box::new(e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    StorageUnavailable(#[from] StoreError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    UpstreamFailure(String),
    #[error("{0}")]
    FeatureComputation(String),
    #[error("{0}")]
    Classifier(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::StorageUnavailable(_) => error_codes::STORAGE_UNAVAILABLE,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::UpstreamFailure(_) => error_codes::UPSTREAM_FAILURE,
            AppError::FeatureComputation(_) => error_codes::FEATURE_ERROR,
            AppError::Classifier(_) => error_codes::CLASSIFIER_ERROR,
            AppError::InvalidInput(_) => error_codes::VALIDATION_ERROR,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::FeatureComputation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            error_to_api_response::<()>(self.code(), self.to_string()),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
