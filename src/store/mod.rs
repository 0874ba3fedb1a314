/// 저장소 트레이트
/// 1. 자격 증명 저장소 (사용자, 토큰 쌍, 일회용 코드)
/// 2. 상품 저장소 (카테고리, 상품, 입찰, 파일)
/// 3. 관심 목록 저장소 (게스트, 관심 목록)
/// 4. 사이트 공통 저장소 (사이트 정보, 구독자, 후기)
// region:    --- Imports
use crate::auction::model::{Category, File, Listing};
use crate::auth::model::{GuestUser, Otp, TokenPairRow, User};
use crate::bidding::model::{Bid, BidAttempt, BidCommit};
use crate::error::AppError;
use crate::general::model::{Review, SiteDetail, Subscriber};
use crate::watchlist::WatchlistOwner;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// endregion: --- Imports

// region:    --- Shared Types
/// 상품의 입찰 집계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BidSummary {
    pub highest: Decimal,
    pub count: i64,
}

impl BidSummary {
    pub fn from_bids(bids: &[Bid]) -> Self {
        Self {
            highest: bids
                .iter()
                .map(|bid| bid.amount)
                .max()
                .unwrap_or(Decimal::ZERO),
            count: bids.len() as i64,
        }
    }
}

/// 상품 목록 조회 조건 (항상 최신순)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFilter {
    All,
    Auctioneer(Uuid),
    /// None이면 카테고리가 없는("other") 상품
    Category(Option<Uuid>),
    /// 같은 카테고리의 다른 상품
    Related { category_id: Option<Uuid>, exclude: Uuid },
}

/// slug 고유성 검사 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    Listing,
    Category,
}
// endregion: --- Shared Types

// region:    --- Store Traits
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
    async fn update_user(&self, user: &User) -> Result<(), AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 사용자의 토큰 쌍을 생성하거나 교체 (단일 문장)
    async fn upsert_token_pair(&self, pair: &TokenPairRow) -> Result<(), AppError>;
    async fn find_token_pair_by_refresh(
        &self,
        refresh: &str,
    ) -> Result<Option<TokenPairRow>, AppError>;
    /// 저장된 refresh 값이 `old_refresh`일 때만 교체; 교체 여부 반환
    async fn swap_token_pair(&self, old_refresh: &str, pair: &TokenPairRow)
        -> Result<bool, AppError>;
    /// access 값이 저장된 토큰 쌍과 일치할 때 사용자 반환
    async fn find_user_by_access(
        &self,
        user_id: Uuid,
        access: &str,
    ) -> Result<Option<User>, AppError>;
    async fn delete_token_pair(&self, user_id: Uuid) -> Result<bool, AppError>;

    async fn upsert_otp(&self, otp: &Otp) -> Result<(), AppError>;
    async fn find_otp(&self, user_id: Uuid) -> Result<Option<Otp>, AppError>;
    async fn delete_otp(&self, user_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_file(&self, file: &File) -> Result<(), AppError>;
    async fn update_file(&self, file: &File) -> Result<(), AppError>;
    async fn find_file(&self, id: Uuid) -> Result<Option<File>, AppError>;

    async fn insert_category(&self, category: &Category) -> Result<(), AppError>;
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError>;
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError>;

    /// slug를 사용 중인 행의 id
    async fn slug_owner(&self, scope: SlugScope, slug: &str) -> Result<Option<Uuid>, AppError>;

    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError>;
    async fn update_listing(&self, listing: &Listing) -> Result<(), AppError>;
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError>;
    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, AppError>;
    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, AppError>;
    /// 마감이 지난 상품의 활성 플래그를 내림; 변경된 행 수 반환
    async fn close_expired_listings(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    async fn bid_summary(&self, listing_id: Uuid) -> Result<BidSummary, AppError>;
    /// 최근 수정된 순서의 입찰
    async fn latest_bids(&self, listing_id: Uuid, limit: i64) -> Result<Vec<Bid>, AppError>;
    /// 최고 입찰가가 `attempt.expected_highest`와 같을 때만 입찰을 확정 (상품 단위 직렬화)
    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<BidCommit, AppError>;
}

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// 게스트가 없으면 생성
    async fn ensure_guest(&self, id: Uuid, now: DateTime<Utc>) -> Result<GuestUser, AppError>;
    async fn find_guest(&self, id: Uuid) -> Result<Option<GuestUser>, AppError>;

    async fn find_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>;
    /// 이미 있으면 아무것도 하지 않음; 새로 추가했는지 반환
    async fn insert_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    async fn delete_watch(&self, id: Uuid) -> Result<(), AppError>;
    async fn watched_listings(&self, owner: WatchlistOwner) -> Result<Vec<Listing>, AppError>;

    /// 게스트 관심 목록을 사용자에게 옮기고 게스트를 삭제 (단일 트랜잭션); 옮긴 행 수 반환
    async fn merge_guest(&self, guest_id: Uuid, user_id: Uuid) -> Result<u64, AppError>;
}

#[async_trait]
pub trait GeneralStore: Send + Sync {
    /// 사이트 정보가 없으면 `default`로 생성한 뒤 저장된 값 반환
    async fn site_detail_or_insert(&self, default: &SiteDetail) -> Result<SiteDetail, AppError>;

    /// 같은 이메일이 있으면 무시; 새로 추가했는지 반환
    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<bool, AppError>;

    async fn insert_review(&self, review: &Review) -> Result<(), AppError>;
    async fn count_reviews(&self) -> Result<i64, AppError>;
    /// 노출 승인된 후기 (최신순)
    async fn shown_reviews(&self) -> Result<Vec<Review>, AppError>;
}

/// 전체 저장소
pub trait Store: CredentialStore + ListingStore + WatchlistStore + GeneralStore {}

impl<T: CredentialStore + ListingStore + WatchlistStore + GeneralStore> Store for T {}
// endregion: --- Store Traits
