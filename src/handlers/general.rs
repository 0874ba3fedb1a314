// region:    --- Imports
use super::{ApiResponse, AppJson};
use crate::error::AppError;
use crate::general::{self, SubscribeCommand};
use crate::query::handlers as query;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;

// endregion: --- Imports

// region:    --- General Handlers
#[derive(Serialize)]
struct SubscriberData {
    email: String,
}

/// 사이트 정보 조회
pub async fn get_site_detail(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let detail = general::site_detail(state.store.as_ref()).await?;
    Ok(ApiResponse::success("Site Details Fetched!", detail))
}

/// 뉴스레터 구독
pub async fn subscribe(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<SubscribeCommand>,
) -> Result<impl IntoResponse, AppError> {
    let email = general::subscribe(state.store.as_ref(), cmd, Utc::now()).await?;
    Ok(ApiResponse::success("Subscription successful!", SubscriberData { email }))
}

/// 후기 조회
pub async fn get_reviews(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let reviews = query::get_reviews(state.store.as_ref(), &state.media).await?;
    Ok(ApiResponse::success("Reviews fetched!", reviews))
}
// endregion: --- General Handlers
