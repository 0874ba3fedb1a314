/// 입찰 관련 커맨드 처리
/// 검증 후 최고 입찰가 비교-교체(CAS)로 확정하며, 다른 입찰이 먼저 확정되면 재검증 후 재시도한다.
// region:    --- Imports
use crate::auction::lifecycle::{derive_view, fits_amount_column, round_amount, ListingState};
use crate::auction::model::Listing;
use crate::bidding::model::{Bid, BidAttempt, BidCommit};
use crate::error::AppError;
use crate::store::Store;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceBidCommand {
    pub amount: Decimal,
}

// 최대 재시도 횟수
const MAX_RETRIES: i32 = 100;

/// 입찰 규칙 검증 (순서: 본인 상품 → 종료 → 시작가 → 최고가 → 금액 상한)
pub fn validate_bid(
    listing: &Listing,
    state: &ListingState,
    bidder_id: Uuid,
    amount: Decimal,
) -> Result<(), AppError> {
    if listing.auctioneer_id == bidder_id {
        return Err(AppError::Forbidden(
            "You cannot bid your own product!".to_string(),
        ));
    }
    if state.is_closed() {
        return Err(AppError::Gone("This auction is closed!".to_string()));
    }
    if amount < listing.price {
        return Err(AppError::BadRequest(
            "Bid amount cannot be less than the bidding price!".to_string(),
        ));
    }
    if amount <= state.highest_bid {
        return Err(AppError::BadRequest(
            "Bid amount must be more than the highest bid!".to_string(),
        ));
    }
    if !fits_amount_column(amount) {
        return Err(AppError::invalid_field(
            "amount",
            "Must be less than 100000000",
        ));
    }
    Ok(())
}

/// 입찰
pub async fn handle_place_bid(
    store: &dyn Store,
    listing_slug: &str,
    bidder_id: Uuid,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<(Listing, Bid), AppError> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: {} {} {}",
        "Command", listing_slug, bidder_id, amount
    );
    let amount = round_amount(amount);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let listing = store
            .find_listing_by_slug(listing_slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;
        let summary = store.bid_summary(listing.id).await?;
        let state = derive_view(&listing, &summary, now);

        validate_bid(&listing, &state, bidder_id, amount)?;

        let attempt = BidAttempt {
            listing_id: listing.id,
            user_id: bidder_id,
            amount,
            expected_highest: state.highest_bid,
            now,
        };
        match store.commit_bid(&attempt).await? {
            BidCommit::Accepted(bid) => {
                info!(
                    "{:<12} --> 입찰 확정: {} {}",
                    "Command", listing.slug, bid.amount
                );
                return Ok((listing, bid));
            }
            BidCommit::StaleHighestBid => {
                warn!(
                    "{:<12} --> 최고 입찰가 변경으로 인한 충돌: 재시도",
                    "Command"
                );
                retries += 1;
            }
        }
    }

    warn!("{:<12} --> 최대 재시도 횟수 초과: {}", "Command", listing_slug);
    Err(AppError::Conflict(
        "Too many concurrent bids, please try again".to_string(),
    ))
}
// endregion: --- Commands
