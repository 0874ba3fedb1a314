/// 인메모리 저장소
/// 테스트와 DATABASE_URL 없는 로컬 실행용. 모든 연산은 하나의 잠금 아래에서 원자적으로 수행된다.
// region:    --- Imports
use super::{
    BidSummary, CredentialStore, GeneralStore, ListingFilter, ListingStore, SlugScope,
    WatchlistStore,
};
use crate::auction::model::{Category, File, Listing};
use crate::auth::model::{GuestUser, Otp, TokenPairRow, User};
use crate::bidding::model::{Bid, BidAttempt, BidCommit};
use crate::error::AppError;
use crate::general::model::{Review, SiteDetail, Subscriber};
use crate::watchlist::{Watchlist, WatchlistOwner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    guests: HashMap<Uuid, GuestUser>,
    token_pairs: HashMap<Uuid, TokenPairRow>,
    otps: HashMap<Uuid, Otp>,
    files: HashMap<Uuid, File>,
    categories: HashMap<Uuid, Category>,
    listings: HashMap<Uuid, Listing>,
    bids: HashMap<Uuid, Bid>,
    watchlists: HashMap<Uuid, Watchlist>,
    site_detail: Option<SiteDetail>,
    subscribers: HashMap<Uuid, Subscriber>,
    reviews: HashMap<Uuid, Review>,
}

impl Tables {
    fn summary(&self, listing_id: Uuid) -> BidSummary {
        let bids: Vec<Bid> = self
            .bids
            .values()
            .filter(|bid| bid.listing_id == listing_id)
            .cloned()
            .collect();
        BidSummary::from_bids(&bids)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 최신순 정렬
fn newest_first(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    listings
}
// endregion: --- Memory Store

// region:    --- Credential Store
#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered!".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("User does not exist!".to_string())),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn upsert_token_pair(&self, pair: &TokenPairRow) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables.token_pairs.insert(pair.user_id, pair.clone());
        Ok(())
    }

    async fn find_token_pair_by_refresh(
        &self,
        refresh: &str,
    ) -> Result<Option<TokenPairRow>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .token_pairs
            .values()
            .find(|pair| pair.refresh == refresh)
            .cloned())
    }

    async fn swap_token_pair(
        &self,
        old_refresh: &str,
        pair: &TokenPairRow,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.token_pairs.get_mut(&pair.user_id) {
            Some(existing) if existing.refresh == old_refresh => {
                *existing = pair.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_user_by_access(
        &self,
        user_id: Uuid,
        access: &str,
    ) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        let matches = tables
            .token_pairs
            .get(&user_id)
            .is_some_and(|pair| pair.access == access);
        Ok(matches.then(|| tables.users.get(&user_id).cloned()).flatten())
    }

    async fn delete_token_pair(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .token_pairs
            .remove(&user_id)
            .is_some())
    }

    async fn upsert_otp(&self, otp: &Otp) -> Result<(), AppError> {
        self.tables.lock().await.otps.insert(otp.user_id, otp.clone());
        Ok(())
    }

    async fn find_otp(&self, user_id: Uuid) -> Result<Option<Otp>, AppError> {
        Ok(self.tables.lock().await.otps.get(&user_id).cloned())
    }

    async fn delete_otp(&self, user_id: Uuid) -> Result<(), AppError> {
        self.tables.lock().await.otps.remove(&user_id);
        Ok(())
    }
}
// endregion: --- Credential Store

// region:    --- Listing Store
#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_file(&self, file: &File) -> Result<(), AppError> {
        self.tables.lock().await.files.insert(file.id, file.clone());
        Ok(())
    }

    async fn update_file(&self, file: &File) -> Result<(), AppError> {
        self.insert_file(file).await
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<File>, AppError> {
        Ok(self.tables.lock().await.files.get(&id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.values().any(|c| c.slug == category.slug) {
            return Err(AppError::Conflict("Category slug already taken".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn slug_owner(&self, scope: SlugScope, slug: &str) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().await;
        Ok(match scope {
            SlugScope::Listing => tables
                .listings
                .values()
                .find(|l| l.slug == slug)
                .map(|l| l.id),
            SlugScope::Category => tables
                .categories
                .values()
                .find(|c| c.slug == slug)
                .map(|c| c.id),
        })
    }

    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables.listings.values().any(|l| l.slug == listing.slug) {
            return Err(AppError::Conflict("Listing slug already taken".to_string()));
        }
        tables.listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn update_listing(&self, listing: &Listing) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .listings
            .values()
            .any(|l| l.slug == listing.slug && l.id != listing.id)
        {
            return Err(AppError::Conflict("Listing slug already taken".to_string()));
        }
        match tables.listings.get_mut(&listing.id) {
            Some(existing) => {
                *existing = listing.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Listing does not exist!".to_string())),
        }
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.tables.lock().await.listings.get(&id).cloned())
    }

    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.listings.values().find(|l| l.slug == slug).cloned())
    }

    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, AppError> {
        let tables = self.tables.lock().await;
        let listings = tables
            .listings
            .values()
            .filter(|l| match filter {
                ListingFilter::All => true,
                ListingFilter::Auctioneer(id) => l.auctioneer_id == id,
                ListingFilter::Category(category_id) => l.category_id == category_id,
                ListingFilter::Related {
                    category_id,
                    exclude,
                } => l.category_id == category_id && l.id != exclude,
            })
            .cloned()
            .collect();
        Ok(newest_first(listings))
    }

    async fn close_expired_listings(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let mut closed = 0;
        for listing in tables.listings.values_mut() {
            if listing.active && listing.closing_date <= now {
                listing.active = false;
                listing.updated_at = now;
                closed += 1;
            }
        }
        Ok(closed)
    }

    async fn bid_summary(&self, listing_id: Uuid) -> Result<BidSummary, AppError> {
        Ok(self.tables.lock().await.summary(listing_id))
    }

    async fn latest_bids(&self, listing_id: Uuid, limit: i64) -> Result<Vec<Bid>, AppError> {
        let tables = self.tables.lock().await;
        let mut bids: Vec<Bid> = tables
            .bids
            .values()
            .filter(|bid| bid.listing_id == listing_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.amount.cmp(&a.amount))
        });
        bids.truncate(limit.max(0) as usize);
        Ok(bids)
    }

    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<BidCommit, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.listings.contains_key(&attempt.listing_id) {
            return Err(AppError::NotFound("Listing does not exist!".to_string()));
        }
        if tables.summary(attempt.listing_id).highest != attempt.expected_highest {
            return Ok(BidCommit::StaleHighestBid);
        }

        let existing = tables
            .bids
            .values_mut()
            .find(|bid| bid.listing_id == attempt.listing_id && bid.user_id == attempt.user_id);
        let bid = match existing {
            Some(bid) => {
                bid.amount = attempt.amount;
                bid.updated_at = attempt.now;
                bid.clone()
            }
            None => {
                let bid = Bid {
                    id: Uuid::new_v4(),
                    user_id: attempt.user_id,
                    listing_id: attempt.listing_id,
                    amount: attempt.amount,
                    created_at: attempt.now,
                    updated_at: attempt.now,
                };
                tables.bids.insert(bid.id, bid.clone());
                bid
            }
        };
        Ok(BidCommit::Accepted(bid))
    }
}
// endregion: --- Listing Store

// region:    --- Watchlist Store
#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn ensure_guest(&self, id: Uuid, now: DateTime<Utc>) -> Result<GuestUser, AppError> {
        let mut tables = self.tables.lock().await;
        let guest = tables
            .guests
            .entry(id)
            .or_insert_with(|| GuestUser { id, created_at: now });
        Ok(guest.clone())
    }

    async fn find_guest(&self, id: Uuid) -> Result<Option<GuestUser>, AppError> {
        Ok(self.tables.lock().await.guests.get(&id).cloned())
    }

    async fn find_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlists
            .values()
            .find(|w| w.owner == owner && w.listing_id == listing_id)
            .map(|w| w.id))
    }

    async fn insert_watch(
        &self,
        owner: WatchlistOwner,
        listing_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .watchlists
            .values()
            .any(|w| w.owner == owner && w.listing_id == listing_id)
        {
            return Ok(false);
        }
        let watch = Watchlist {
            id: Uuid::new_v4(),
            listing_id,
            owner,
            created_at: now,
        };
        tables.watchlists.insert(watch.id, watch);
        Ok(true)
    }

    async fn delete_watch(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.lock().await.watchlists.remove(&id);
        Ok(())
    }

    async fn watched_listings(&self, owner: WatchlistOwner) -> Result<Vec<Listing>, AppError> {
        let tables = self.tables.lock().await;
        let mut watches: Vec<&Watchlist> = tables
            .watchlists
            .values()
            .filter(|w| w.owner == owner)
            .collect();
        watches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(watches
            .into_iter()
            .filter_map(|w| tables.listings.get(&w.listing_id).cloned())
            .collect())
    }

    async fn merge_guest(&self, guest_id: Uuid, user_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let guest_owner = WatchlistOwner::Guest(guest_id);
        let user_owner = WatchlistOwner::User(user_id);

        let guest_rows: Vec<Watchlist> = tables
            .watchlists
            .values()
            .filter(|w| w.owner == guest_owner)
            .cloned()
            .collect();

        let mut moved = 0;
        for row in &guest_rows {
            let exists = tables
                .watchlists
                .values()
                .any(|w| w.owner == user_owner && w.listing_id == row.listing_id);
            if !exists {
                let watch = Watchlist {
                    id: Uuid::new_v4(),
                    listing_id: row.listing_id,
                    owner: user_owner,
                    created_at: row.created_at,
                };
                tables.watchlists.insert(watch.id, watch);
                moved += 1;
            }
            tables.watchlists.remove(&row.id);
        }
        tables.guests.remove(&guest_id);
        Ok(moved)
    }
}
// endregion: --- Watchlist Store

// region:    --- General Store
#[async_trait]
impl GeneralStore for MemoryStore {
    async fn site_detail_or_insert(&self, default: &SiteDetail) -> Result<SiteDetail, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .site_detail
            .get_or_insert_with(|| default.clone())
            .clone())
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .subscribers
            .values()
            .any(|s| s.email == subscriber.email)
        {
            return Ok(false);
        }
        tables.subscribers.insert(subscriber.id, subscriber.clone());
        Ok(true)
    }

    async fn insert_review(&self, review: &Review) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn count_reviews(&self) -> Result<i64, AppError> {
        Ok(self.tables.lock().await.reviews.len() as i64)
    }

    async fn shown_reviews(&self) -> Result<Vec<Review>, AppError> {
        let tables = self.tables.lock().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.shown)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}
// endregion: --- General Store
