/// PostgreSQL 저장소
/// 입찰 확정과 게스트 병합은 트랜잭션 안에서 수행된다.
// region:    --- Imports
use super::{
    BidSummary, CredentialStore, GeneralStore, ListingFilter, ListingStore, SlugScope,
    WatchlistStore,
};
use crate::auction::model::{Category, File, Listing};
use crate::auth::model::{GuestUser, Otp, TokenPairRow, User};
use crate::bidding::model::{Bid, BidAttempt, BidCommit};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::general::model::{Review, SiteDetail, Subscriber};
use crate::query::queries;
use crate::watchlist::WatchlistOwner;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Pg Store
pub struct PgStore {
    db: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    highest: Decimal,
    count: i64,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
// endregion: --- Pg Store

// region:    --- Credential Store
#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(queries::INSERT_USER)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_email_verified)
            .bind(user.is_superuser)
            .bind(user.is_staff)
            .bind(user.avatar_id)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(self.db.pool())
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Email already registered!".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(queries::UPDATE_USER)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_email_verified)
            .bind(user.is_superuser)
            .bind(user.is_staff)
            .bind(user.avatar_id)
            .bind(user.updated_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn upsert_token_pair(&self, pair: &TokenPairRow) -> Result<(), AppError> {
        sqlx::query(queries::UPSERT_TOKEN_PAIR)
            .bind(pair.user_id)
            .bind(&pair.access)
            .bind(&pair.refresh)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn find_token_pair_by_refresh(
        &self,
        refresh: &str,
    ) -> Result<Option<TokenPairRow>, AppError> {
        Ok(sqlx::query_as::<_, TokenPairRow>(queries::GET_TOKEN_PAIR_BY_REFRESH)
            .bind(refresh)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn swap_token_pair(
        &self,
        old_refresh: &str,
        pair: &TokenPairRow,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(queries::SWAP_TOKEN_PAIR)
            .bind(pair.user_id)
            .bind(old_refresh)
            .bind(&pair.access)
            .bind(&pair.refresh)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_user_by_access(
        &self,
        user_id: Uuid,
        access: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER_BY_ACCESS)
            .bind(user_id)
            .bind(access)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn delete_token_pair(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(queries::DELETE_TOKEN_PAIR)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_otp(&self, otp: &Otp) -> Result<(), AppError> {
        sqlx::query(queries::UPSERT_OTP)
            .bind(otp.user_id)
            .bind(otp.code)
            .bind(otp.issued_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn find_otp(&self, user_id: Uuid) -> Result<Option<Otp>, AppError> {
        Ok(sqlx::query_as::<_, Otp>(queries::GET_OTP)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn delete_otp(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(queries::DELETE_OTP)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
// endregion: --- Credential Store

// region:    --- Listing Store
#[async_trait]
impl ListingStore for PgStore {
    async fn insert_file(&self, file: &File) -> Result<(), AppError> {
        sqlx::query(queries::UPSERT_FILE)
            .bind(file.id)
            .bind(&file.resource_type)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn update_file(&self, file: &File) -> Result<(), AppError> {
        self.insert_file(file).await
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<File>, AppError> {
        Ok(sqlx::query_as::<_, File>(queries::GET_FILE)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), AppError> {
        let result = sqlx::query(queries::INSERT_CATEGORY)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .execute(self.db.pool())
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Category slug already taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(sqlx::query_as::<_, Category>(queries::GET_ALL_CATEGORIES)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        Ok(sqlx::query_as::<_, Category>(queries::GET_CATEGORY)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        Ok(sqlx::query_as::<_, Category>(queries::GET_CATEGORY_BY_SLUG)
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn slug_owner(&self, scope: SlugScope, slug: &str) -> Result<Option<Uuid>, AppError> {
        let sql = match scope {
            SlugScope::Listing => queries::GET_LISTING_SLUG_OWNER,
            SlugScope::Category => queries::GET_CATEGORY_SLUG_OWNER,
        };
        Ok(sqlx::query_scalar::<_, Uuid>(sql)
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        let result = sqlx::query(queries::INSERT_LISTING)
            .bind(listing.id)
            .bind(listing.auctioneer_id)
            .bind(&listing.name)
            .bind(&listing.slug)
            .bind(&listing.description)
            .bind(listing.category_id)
            .bind(listing.price)
            .bind(listing.closing_date)
            .bind(listing.active)
            .bind(listing.image_id)
            .bind(listing.created_at)
            .bind(listing.updated_at)
            .execute(self.db.pool())
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Listing slug already taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_listing(&self, listing: &Listing) -> Result<(), AppError> {
        let result = sqlx::query(queries::UPDATE_LISTING)
            .bind(listing.id)
            .bind(&listing.name)
            .bind(&listing.slug)
            .bind(&listing.description)
            .bind(listing.category_id)
            .bind(listing.price)
            .bind(listing.closing_date)
            .bind(listing.active)
            .bind(listing.image_id)
            .bind(listing.updated_at)
            .execute(self.db.pool())
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(AppError::NotFound("Listing does not exist!".to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Listing slug already taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, AppError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTING_BY_SLUG)
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, AppError> {
        let pool = self.db.pool();
        let listings = match filter {
            ListingFilter::All => {
                sqlx::query_as::<_, Listing>(queries::GET_ALL_LISTINGS)
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::Auctioneer(id) => {
                sqlx::query_as::<_, Listing>(queries::GET_AUCTIONEER_LISTINGS)
                    .bind(id)
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::Category(category_id) => {
                sqlx::query_as::<_, Listing>(queries::GET_CATEGORY_LISTINGS)
                    .bind(category_id)
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::Related {
                category_id,
                exclude,
            } => {
                sqlx::query_as::<_, Listing>(queries::GET_RELATED_LISTINGS)
                    .bind(category_id)
                    .bind(exclude)
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(listings)
    }

    async fn close_expired_listings(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(queries::CLOSE_EXPIRED_LISTINGS)
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn bid_summary(&self, listing_id: Uuid) -> Result<BidSummary, AppError> {
        let row = sqlx::query_as::<_, SummaryRow>(queries::GET_BID_SUMMARY)
            .bind(listing_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(BidSummary {
            highest: row.highest,
            count: row.count,
        })
    }

    async fn latest_bids(&self, listing_id: Uuid, limit: i64) -> Result<Vec<Bid>, AppError> {
        Ok(sqlx::query_as::<_, Bid>(queries::GET_LATEST_BIDS)
            .bind(listing_id)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<BidCommit, AppError> {
        let attempt = attempt.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    // 상품 행 잠금으로 같은 상품의 입찰을 직렬화
                    let locked = sqlx::query_scalar::<_, Uuid>(queries::LOCK_LISTING)
                        .bind(attempt.listing_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if locked.is_none() {
                        return Err(AppError::NotFound("Listing does not exist!".to_string()));
                    }

                    let highest = sqlx::query_scalar::<_, Decimal>(queries::GET_HIGHEST_BID)
                        .bind(attempt.listing_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    if highest != attempt.expected_highest {
                        debug!(
                            "{:<12} --> 최고 입찰가 변경됨: expected={} actual={}",
                            "PgStore", attempt.expected_highest, highest
                        );
                        return Ok(BidCommit::StaleHighestBid);
                    }

                    let result = sqlx::query_as::<_, Bid>(queries::UPSERT_BID)
                        .bind(Uuid::new_v4())
                        .bind(attempt.user_id)
                        .bind(attempt.listing_id)
                        .bind(attempt.amount)
                        .bind(attempt.now)
                        .fetch_one(&mut **tx)
                        .await;
                    match result {
                        Ok(bid) => Ok(BidCommit::Accepted(bid)),
                        Err(e) if is_unique_violation(&e) => {
                            warn!("{:<12} --> 동일 금액 입찰 충돌", "PgStore");
                            Ok(BidCommit::StaleHighestBid)
                        }
                        Err(e) => Err(e.into()),
                    }
                })
            })
            .await
    }
}
// endregion: --- Listing Store

// region:    --- Watchlist Store
#[async_trait]
impl WatchlistStore for PgStore {
    async fn ensure_guest(&self, id: Uuid, now: DateTime<Utc>) -> Result<GuestUser, AppError> {
        sqlx::query(queries::INSERT_GUEST)
            .bind(id)
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(sqlx::query_as::<_, GuestUser>(queries::GET_GUEST)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn find_guest(&self, id: Uuid) -> Result<Option<GuestUser>, AppError> {
        Ok(sqlx::query_as::<_, GuestUser>(queries::GET_GUEST)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        Ok(sqlx::query_scalar::<_, Uuid>(queries::GET_WATCH)
            .bind(listing_id)
            .bind(owner.user_id())
            .bind(owner.guest_id())
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn insert_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(queries::INSERT_WATCH)
            .bind(Uuid::new_v4())
            .bind(listing_id)
            .bind(owner.user_id())
            .bind(owner.guest_id())
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_watch(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(queries::DELETE_WATCH)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn watched_listings(&self, owner: WatchlistOwner) -> Result<Vec<Listing>, AppError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_WATCHED_LISTINGS)
            .bind(owner.user_id())
            .bind(owner.guest_id())
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn merge_guest(&self, guest_id: Uuid, user_id: Uuid) -> Result<u64, AppError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let copied = sqlx::query(queries::COPY_GUEST_WATCHLIST)
                        .bind(guest_id)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?;
                    sqlx::query(queries::DELETE_GUEST)
                        .bind(guest_id)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<u64, AppError>(copied.rows_affected())
                })
            })
            .await
    }
}
// endregion: --- Watchlist Store

// region:    --- General Store
#[async_trait]
impl GeneralStore for PgStore {
    async fn site_detail_or_insert(&self, default: &SiteDetail) -> Result<SiteDetail, AppError> {
        sqlx::query(queries::INSERT_SITE_DETAIL)
            .bind(&default.name)
            .bind(&default.email)
            .bind(&default.phone)
            .bind(&default.address)
            .bind(&default.fb)
            .bind(&default.tw)
            .bind(&default.wh)
            .bind(&default.ig)
            .execute(self.db.pool())
            .await?;
        Ok(sqlx::query_as::<_, SiteDetail>(queries::GET_SITE_DETAIL)
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<bool, AppError> {
        let result = sqlx::query(queries::INSERT_SUBSCRIBER)
            .bind(subscriber.id)
            .bind(&subscriber.email)
            .bind(subscriber.exported)
            .bind(subscriber.created_at)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_review(&self, review: &Review) -> Result<(), AppError> {
        sqlx::query(queries::INSERT_REVIEW)
            .bind(review.id)
            .bind(review.reviewer_id)
            .bind(review.shown)
            .bind(&review.text)
            .bind(review.created_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn count_reviews(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>(queries::COUNT_REVIEWS)
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn shown_reviews(&self) -> Result<Vec<Review>, AppError> {
        Ok(sqlx::query_as::<_, Review>(queries::GET_SHOWN_REVIEWS)
            .fetch_all(self.db.pool())
            .await?)
    }
}
// endregion: --- General Store
