// region:    --- Imports
use crate::error::AppError;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub mod auctioneer;
pub mod auth;
pub mod general;
pub mod listings;

// endregion: --- Imports

// region:    --- Envelope
/// 성공 응답 형식: {"status": "success", "message": ..., "data": ...}
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

/// 본문 파싱 실패를 검증 오류 형식으로 돌려주는 JSON 추출기
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `quantity` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct QuantityParams {
    pub quantity: Option<usize>,
}
// endregion: --- Envelope
