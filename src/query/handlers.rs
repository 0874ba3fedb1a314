/// 조회 처리
/// 저장된 상품/입찰을 응답용 뷰로 변환한다. 파생 상태는 조회 시점 기준으로 계산된다.
// region:    --- Imports
use crate::auction::commands::owned_listing;
use crate::auction::lifecycle::{self, OTHER_CATEGORY_SLUG};
use crate::auction::model::{Category, Listing};
use crate::auth::identity::Client;
use crate::auth::model::User;
use crate::bidding::model::Bid;
use crate::error::AppError;
use crate::media::{MediaUrls, AVATARS_FOLDER, LISTINGS_FOLDER};
use crate::store::{ListingFilter, Store};
use crate::watchlist::{self, WatchlistOwner};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Views
/// 최근 입찰 조회 개수
pub const LATEST_BIDS_LIMIT: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortUser {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub auctioneer: ShortUser,
    pub name: String,
    pub slug: String,
    pub desc: String,
    pub category: String,
    pub price: Decimal,
    pub closing_date: DateTime<Utc>,
    pub time_left_seconds: i64,
    pub active: bool,
    pub bids_count: i64,
    pub highest_bid: Decimal,
    pub image: String,
    pub watchlist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidView {
    pub user: ShortUser,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetail {
    pub listing: ListingView,
    pub related_listings: Vec<ListingView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingBids {
    pub listing: String,
    pub bids: Vec<BidView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub reviewer: ShortUser,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}
// endregion: --- Views

// region:    --- View Builders
async fn avatar_url(
    store: &dyn Store,
    media: &MediaUrls,
    user: &User,
) -> Result<Option<String>, AppError> {
    let Some(avatar_id) = user.avatar_id else {
        return Ok(None);
    };
    Ok(store
        .find_file(avatar_id)
        .await?
        .map(|file| media.file_url(AVATARS_FOLDER, &file)))
}

async fn short_user(
    store: &dyn Store,
    media: &MediaUrls,
    user_id: Uuid,
) -> Result<ShortUser, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("사용자 없음: {}", user_id)))?;
    Ok(ShortUser {
        name: user.full_name(),
        avatar: avatar_url(store, media, &user).await?,
    })
}

pub async fn listing_view(
    store: &dyn Store,
    media: &MediaUrls,
    listing: &Listing,
    owner: Option<WatchlistOwner>,
    now: DateTime<Utc>,
) -> Result<ListingView, AppError> {
    let state = lifecycle::current_state(store, listing, now).await?;
    let image = store
        .find_file(listing.image_id)
        .await?
        .map(|file| media.file_url(LISTINGS_FOLDER, &file))
        .unwrap_or_default();

    Ok(ListingView {
        auctioneer: short_user(store, media, listing.auctioneer_id).await?,
        name: listing.name.clone(),
        slug: listing.slug.clone(),
        desc: listing.description.clone(),
        category: lifecycle::category_name(store, listing.category_id).await?,
        price: listing.price,
        closing_date: listing.closing_date,
        time_left_seconds: state.time_left_seconds,
        active: state.active,
        bids_count: state.bids_count,
        highest_bid: state.highest_bid,
        image,
        watchlist: watchlist::is_watched(store, owner, listing.id).await?,
    })
}

async fn listing_views(
    store: &dyn Store,
    media: &MediaUrls,
    listings: &[Listing],
    owner: Option<WatchlistOwner>,
    now: DateTime<Utc>,
) -> Result<Vec<ListingView>, AppError> {
    let mut views = Vec::with_capacity(listings.len());
    for listing in listings {
        views.push(listing_view(store, media, listing, owner, now).await?);
    }
    Ok(views)
}

pub async fn bid_views(
    store: &dyn Store,
    media: &MediaUrls,
    bids: &[Bid],
) -> Result<Vec<BidView>, AppError> {
    let mut views = Vec::with_capacity(bids.len());
    for bid in bids {
        views.push(BidView {
            user: short_user(store, media, bid.user_id).await?,
            amount: bid.amount,
            created_at: bid.created_at,
            updated_at: bid.updated_at,
        });
    }
    Ok(views)
}

fn take_quantity(mut listings: Vec<Listing>, quantity: Option<usize>) -> Vec<Listing> {
    if let Some(quantity) = quantity.filter(|q| *q > 0) {
        listings.truncate(quantity);
    }
    listings
}

async fn listing_by_slug(store: &dyn Store, slug: &str) -> Result<Listing, AppError> {
    store
        .find_listing_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))
}
// endregion: --- View Builders

// region:    --- Query Handlers
/// 전체 상품 조회 (최신순)
pub async fn get_listings(
    store: &dyn Store,
    media: &MediaUrls,
    client: &Client,
    quantity: Option<usize>,
    now: DateTime<Utc>,
) -> Result<Vec<ListingView>, AppError> {
    info!("{:<12} --> 상품 목록 조회", "Query");
    let listings = take_quantity(store.list_listings(ListingFilter::All).await?, quantity);
    listing_views(store, media, &listings, client.watch_owner(), now).await
}

/// 상품 상세 + 같은 카테고리의 다른 상품
pub async fn get_listing_detail(
    store: &dyn Store,
    media: &MediaUrls,
    slug: &str,
    now: DateTime<Utc>,
) -> Result<ListingDetail, AppError> {
    info!("{:<12} --> 상품 상세 조회: {}", "Query", slug);
    let listing = listing_by_slug(store, slug).await?;
    let related = store
        .list_listings(ListingFilter::Related {
            category_id: listing.category_id,
            exclude: listing.id,
        })
        .await?;
    Ok(ListingDetail {
        listing: listing_view(store, media, &listing, None, now).await?,
        related_listings: listing_views(store, media, &related, None, now).await?,
    })
}

/// 클라이언트 관심 목록
pub async fn get_watchlist(
    store: &dyn Store,
    media: &MediaUrls,
    client: &Client,
    now: DateTime<Utc>,
) -> Result<Vec<ListingView>, AppError> {
    info!("{:<12} --> 관심 목록 조회", "Query");
    let listings = watchlist::watched_listings(store, client).await?;
    listing_views(store, media, &listings, client.watch_owner(), now).await
}

pub async fn get_categories(store: &dyn Store) -> Result<Vec<Category>, AppError> {
    info!("{:<12} --> 카테고리 조회", "Query");
    store.list_categories().await
}

/// 카테고리별 상품 ("other"는 카테고리 없는 상품)
pub async fn get_category_listings(
    store: &dyn Store,
    media: &MediaUrls,
    client: &Client,
    slug: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ListingView>, AppError> {
    info!("{:<12} --> 카테고리 상품 조회: {}", "Query", slug);
    let category_id = if slug == OTHER_CATEGORY_SLUG {
        None
    } else {
        let category = store
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid category!".to_string()))?;
        Some(category.id)
    };
    let listings = store.list_listings(ListingFilter::Category(category_id)).await?;
    listing_views(store, media, &listings, client.watch_owner(), now).await
}

/// 최근 수정된 입찰 3건
pub async fn get_listing_bids(
    store: &dyn Store,
    media: &MediaUrls,
    slug: &str,
) -> Result<ListingBids, AppError> {
    info!("{:<12} --> 입찰 이력 조회: {}", "Query", slug);
    let listing = listing_by_slug(store, slug).await?;
    let bids = store.latest_bids(listing.id, LATEST_BIDS_LIMIT).await?;
    Ok(ListingBids {
        listing: listing.name,
        bids: bid_views(store, media, &bids).await?,
    })
}

pub async fn get_profile(
    store: &dyn Store,
    media: &MediaUrls,
    user: &User,
) -> Result<ProfileView, AppError> {
    Ok(ProfileView {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        avatar: avatar_url(store, media, user).await?,
    })
}

/// 경매 등록자 본인 상품
pub async fn get_auctioneer_listings(
    store: &dyn Store,
    media: &MediaUrls,
    user: &User,
    quantity: Option<usize>,
    now: DateTime<Utc>,
) -> Result<Vec<ListingView>, AppError> {
    info!("{:<12} --> 등록자 상품 조회: {}", "Query", user.id);
    let listings = take_quantity(
        store.list_listings(ListingFilter::Auctioneer(user.id)).await?,
        quantity,
    );
    listing_views(
        store,
        media,
        &listings,
        Some(WatchlistOwner::User(user.id)),
        now,
    )
    .await
}

/// 본인 상품의 최근 입찰
pub async fn get_auctioneer_listing_bids(
    store: &dyn Store,
    media: &MediaUrls,
    user: &User,
    slug: &str,
) -> Result<ListingBids, AppError> {
    info!("{:<12} --> 등록자 입찰 조회: {}", "Query", slug);
    let listing = owned_listing(store, slug, user).await?;
    let bids = store.latest_bids(listing.id, LATEST_BIDS_LIMIT).await?;
    Ok(ListingBids {
        listing: listing.name,
        bids: bid_views(store, media, &bids).await?,
    })
}
/// 노출 승인된 후기
pub async fn get_reviews(
    store: &dyn Store,
    media: &MediaUrls,
) -> Result<Vec<ReviewView>, AppError> {
    let reviews = store.shown_reviews().await?;
    let mut views = Vec::with_capacity(reviews.len());
    for review in reviews {
        views.push(ReviewView {
            reviewer: short_user(store, media, review.reviewer_id).await?,
            text: review.text,
        });
    }
    Ok(views)
}
// endregion: --- Query Handlers
