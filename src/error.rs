// region:    --- Imports
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

// endregion: --- Imports

// region:    --- App Error
/// 요청 경계에서 응답으로 변환되는 오류 분류
#[derive(Debug, Error)]
pub enum AppError {
    /// 입력 검증 실패 (필드별 상세 포함)
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// 동시 입찰 재시도 한도 초과 등
    #[error("{0}")]
    Conflict(String),

    /// 종료된 경매
    #[error("{0}")]
    Gone(String),

    /// 유효 시간이 지난 일회용 코드
    #[error("{0}")]
    Expired(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 단일 필드 검증 오류
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.to_string());
        AppError::Validation {
            message: "Invalid Entry".to_string(),
            fields,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) | AppError::Expired(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Gone(_) => StatusCode::GONE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let field = field.to_string();
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid {}", field));
                (field, message)
            })
            .collect();
        AppError::Validation {
            message: "Invalid Entry".to_string(),
            fields,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_field("body", &rejection.body_text())
    }
}
// endregion: --- App Error

// region:    --- Response
#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, fields } => ErrorBody {
                status: "failure",
                message,
                data: (!fields.is_empty()).then_some(fields),
            },
            AppError::Database(ref e) => {
                error!("{:<12} --> 데이터베이스 오류: {:?}", "Error", e);
                ErrorBody {
                    status: "failure",
                    message: "Server Error".to_string(),
                    data: None,
                }
            }
            AppError::Internal(ref e) => {
                error!("{:<12} --> 내부 오류: {}", "Error", e);
                ErrorBody {
                    status: "failure",
                    message: "Server Error".to_string(),
                    data: None,
                }
            }
            other => ErrorBody {
                status: "failure",
                message: other.to_string(),
                data: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
// endregion: --- Response
