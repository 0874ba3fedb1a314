// region:    --- Imports
use super::{ApiResponse, AppJson, QuantityParams};
use crate::auth::identity::{AuthUser, Client};
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::error::AppError;
use crate::query::handlers as query;
use crate::state::AppState;
use crate::watchlist::{self, ToggleOutcome};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Query Handlers
/// 전체 상품 조회
pub async fn get_listings(
    State(state): State<AppState>,
    client: Client,
    Query(params): Query<QuantityParams>,
) -> Result<impl IntoResponse, AppError> {
    let listings = query::get_listings(
        state.store.as_ref(),
        &state.media,
        &client,
        params.quantity,
        Utc::now(),
    )
    .await?;
    Ok(ApiResponse::success("Listings fetched", listings))
}

/// 상품 상세 조회
pub async fn get_listing_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail =
        query::get_listing_detail(state.store.as_ref(), &state.media, &slug, Utc::now()).await?;
    Ok(ApiResponse::success("Listing details fetched", detail))
}

/// 관심 목록 조회
pub async fn get_watchlist(
    State(state): State<AppState>,
    client: Client,
) -> Result<impl IntoResponse, AppError> {
    let listings =
        query::get_watchlist(state.store.as_ref(), &state.media, &client, Utc::now()).await?;
    Ok(ApiResponse::success("Watchlist Listings fetched", listings))
}

/// 카테고리 조회
pub async fn get_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = query::get_categories(state.store.as_ref()).await?;
    Ok(ApiResponse::success("Categories fetched", categories))
}

/// 카테고리별 상품 조회
pub async fn get_category_listings(
    State(state): State<AppState>,
    client: Client,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let listings = query::get_category_listings(
        state.store.as_ref(),
        &state.media,
        &client,
        &slug,
        Utc::now(),
    )
    .await?;
    Ok(ApiResponse::success("Category Listings fetched", listings))
}

/// 최근 입찰 조회
pub async fn get_listing_bids(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bids = query::get_listing_bids(state.store.as_ref(), &state.media, &slug).await?;
    Ok(ApiResponse::success("Listing Bids fetched", bids))
}
// endregion: --- Query Handlers

// region:    --- Command Handlers
#[derive(Debug, Deserialize)]
pub struct WatchlistRequest {
    pub slug: String,
}

#[derive(Serialize)]
struct WatchlistData {
    #[serde(skip_serializing_if = "Option::is_none")]
    guestuser_id: Option<Uuid>,
}

/// 관심 목록 토글 (추가 201, 삭제 200)
pub async fn toggle_watchlist(
    State(state): State<AppState>,
    client: Client,
    AppJson(req): AppJson<WatchlistRequest>,
) -> Result<Response, AppError> {
    let result = watchlist::toggle(state.store.as_ref(), &req.slug, &client, Utc::now()).await?;
    let target = if matches!(client, Client::Authenticated(_)) {
        "user"
    } else {
        "guest"
    };
    let (verb, status) = match result.outcome {
        ToggleOutcome::Added => ("added to", StatusCode::CREATED),
        ToggleOutcome::Removed => ("removed from", StatusCode::OK),
    };
    Ok(ApiResponse::success(
        format!("Listing {} {} watchlist", verb, target),
        WatchlistData {
            guestuser_id: result.owner.guest_id(),
        },
    )
    .with_status(status))
}

/// 입찰
pub async fn place_bid(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    AppJson(cmd): AppJson<PlaceBidCommand>,
) -> Result<Response, AppError> {
    info!("{:<12} --> 입찰 요청: {} {}", "Handler", slug, cmd.amount);
    let store = state.store.as_ref();
    let (_, bid) = handle_place_bid(store, &slug, user.id, cmd.amount, Utc::now()).await?;
    let mut views = query::bid_views(store, &state.media, std::slice::from_ref(&bid)).await?;
    let view = views
        .pop()
        .ok_or_else(|| AppError::Internal("입찰 뷰 생성 실패".to_string()))?;
    Ok(ApiResponse::success("Bid added to listing", view).with_status(StatusCode::CREATED))
}
// endregion: --- Command Handlers
