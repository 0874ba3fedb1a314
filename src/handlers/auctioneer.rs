// region:    --- Imports
use super::{ApiResponse, AppJson, QuantityParams};
use crate::auction::commands::{
    handle_create_listing, handle_update_listing, handle_update_profile, CreateListingCommand,
    UpdateListingCommand, UpdateProfileCommand,
};
use crate::auth::identity::AuthUser;
use crate::error::AppError;
use crate::query::handlers as query;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

// endregion: --- Imports

// region:    --- Auctioneer Handlers
/// 프로필 조회
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = query::get_profile(state.store.as_ref(), &state.media, &user).await?;
    Ok(ApiResponse::success("User details fetched!", profile))
}

/// 프로필 수정
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(cmd): AppJson<UpdateProfileCommand>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let user = handle_update_profile(store, &user, cmd, Utc::now()).await?;
    let profile = query::get_profile(store, &state.media, &user).await?;
    Ok(ApiResponse::success("User updated!", profile))
}

/// 본인 상품 조회
pub async fn get_listings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<QuantityParams>,
) -> Result<impl IntoResponse, AppError> {
    let listings = query::get_auctioneer_listings(
        state.store.as_ref(),
        &state.media,
        &user,
        params.quantity,
        Utc::now(),
    )
    .await?;
    Ok(ApiResponse::success("Auctioneer Listings fetched", listings))
}

/// 상품 등록
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(cmd): AppJson<CreateListingCommand>,
) -> Result<Response, AppError> {
    let store = state.store.as_ref();
    let now = Utc::now();
    let listing = handle_create_listing(store, &user, cmd, now).await?;
    let view = query::listing_view(store, &state.media, &listing, None, now).await?;
    Ok(ApiResponse::success("Listing created successfully", view).with_status(StatusCode::CREATED))
}

/// 상품 수정
pub async fn update_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    AppJson(cmd): AppJson<UpdateListingCommand>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let now = Utc::now();
    let listing = handle_update_listing(store, &user, &slug, cmd, now).await?;
    let view = query::listing_view(store, &state.media, &listing, None, now).await?;
    Ok(ApiResponse::success("Listing updated successfully", view))
}

/// 본인 상품의 입찰 조회
pub async fn get_listing_bids(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bids =
        query::get_auctioneer_listing_bids(state.store.as_ref(), &state.media, &user, &slug)
            .await?;
    Ok(ApiResponse::success("Listing Bids fetched", bids))
}
// endregion: --- Auctioneer Handlers
