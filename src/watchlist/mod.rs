/// 관심 목록 서비스
/// 1. 관심 목록 토글 (사용자 또는 게스트)
/// 2. 로그인 시 게스트 관심 목록 병합
// region:    --- Imports
use crate::auction::model::Listing;
use crate::auth::identity::Client;
use crate::error::AppError;
use crate::store::Store;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Model
/// 관심 목록 소유자 (사용자 XOR 게스트)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchlistOwner {
    User(Uuid),
    Guest(Uuid),
}

impl WatchlistOwner {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            WatchlistOwner::User(id) => Some(*id),
            WatchlistOwner::Guest(_) => None,
        }
    }

    pub fn guest_id(&self) -> Option<Uuid> {
        match self {
            WatchlistOwner::User(_) => None,
            WatchlistOwner::Guest(id) => Some(*id),
        }
    }
}

// 관심 목록 모델
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub owner: WatchlistOwner,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleResult {
    pub outcome: ToggleOutcome,
    pub owner: WatchlistOwner,
}
// endregion: --- Model

// region:    --- Commands
/// 관심 목록 토글
/// 익명 클라이언트는 게스트를 새로 만들고, 게스트 id는 없으면 그 id로 생성한다.
pub async fn toggle(
    store: &dyn Store,
    listing_slug: &str,
    client: &Client,
    now: DateTime<Utc>,
) -> Result<ToggleResult, AppError> {
    let listing = store
        .find_listing_by_slug(listing_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;

    let owner = match client {
        Client::Authenticated(user) => WatchlistOwner::User(user.id),
        Client::Guest(guest_id) => {
            store.ensure_guest(*guest_id, now).await?;
            WatchlistOwner::Guest(*guest_id)
        }
        Client::Anonymous => {
            let guest = store.ensure_guest(Uuid::new_v4(), now).await?;
            info!("{:<12} --> 게스트 생성: {}", "Watchlist", guest.id);
            WatchlistOwner::Guest(guest.id)
        }
    };

    let outcome = match store.find_watch(owner, listing.id).await? {
        Some(watch_id) => {
            store.delete_watch(watch_id).await?;
            ToggleOutcome::Removed
        }
        None if store.insert_watch(owner, listing.id, now).await? => ToggleOutcome::Added,
        None => {
            // 동시에 들어온 토글이 먼저 추가한 행은 이 토글이 제거
            if let Some(watch_id) = store.find_watch(owner, listing.id).await? {
                store.delete_watch(watch_id).await?;
            }
            ToggleOutcome::Removed
        }
    };
    info!(
        "{:<12} --> 관심 목록 토글: {:?} {:?} {}",
        "Watchlist", owner, outcome, listing.slug
    );

    Ok(ToggleResult { outcome, owner })
}

/// 게스트 관심 목록을 사용자에게 병합 (로그인 성공 시 1회)
pub async fn merge_guest_into_user(
    store: &dyn Store,
    guest_id: Uuid,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let moved = store.merge_guest(guest_id, user_id).await?;
    info!(
        "{:<12} --> 게스트 관심 목록 병합: guest={} user={} moved={}",
        "Watchlist", guest_id, user_id, moved
    );
    Ok(moved)
}
// endregion: --- Commands

// region:    --- Queries
/// 클라이언트의 관심 상품 (익명이면 빈 목록)
pub async fn watched_listings(
    store: &dyn Store,
    client: &Client,
) -> Result<Vec<Listing>, AppError> {
    match client.watch_owner() {
        Some(owner) => store.watched_listings(owner).await,
        None => Ok(Vec::new()),
    }
}

pub async fn is_watched(
    store: &dyn Store,
    owner: Option<WatchlistOwner>,
    listing_id: Uuid,
) -> Result<bool, AppError> {
    match owner {
        Some(owner) => Ok(store.find_watch(owner, listing_id).await?.is_some()),
        None => Ok(false),
    }
}
// endregion: --- Queries

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, WatchlistStore};
    use crate::testing::{seed_listing, seed_user};
    use std::sync::Arc;

    #[tokio::test]
    async fn toggle_twice_restores_membership() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let watcher = seed_user(&store, "watcher@email.com", now).await;
        let listing = seed_listing(&store, &owner, "Vintage Clock", now).await;
        let client = Client::Authenticated(watcher.clone());

        let first = toggle(&store, &listing.slug, &client, now).await.unwrap();
        assert_eq!(first.outcome, ToggleOutcome::Added);
        assert!(is_watched(&store, client.watch_owner(), listing.id).await.unwrap());

        let second = toggle(&store, &listing.slug, &client, now).await.unwrap();
        assert_eq!(second.outcome, ToggleOutcome::Removed);
        assert!(!is_watched(&store, client.watch_owner(), listing.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_insert_reports_nothing_added() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let listing = seed_listing(&store, &owner, "Vintage Clock", now).await;
        let watcher = WatchlistOwner::User(owner.id);

        assert!(store.insert_watch(watcher, listing.id, now).await.unwrap());
        assert!(!store.insert_watch(watcher, listing.id, now).await.unwrap());
        assert_eq!(store.watched_listings(watcher).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_cancel_out() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let owner = seed_user(store.as_ref(), "owner@email.com", now).await;
        let watcher = seed_user(store.as_ref(), "watcher@email.com", now).await;
        let listing = seed_listing(store.as_ref(), &owner, "Vintage Clock", now).await;

        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = Arc::clone(&store);
            let slug = listing.slug.clone();
            let client = Client::Authenticated(watcher.clone());
            handles.push(tokio::spawn(async move {
                toggle(store.as_ref(), &slug, &client, now).await
            }));
        }
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap().unwrap().outcome);
        }

        assert!(outcomes.contains(&ToggleOutcome::Added));
        assert!(outcomes.contains(&ToggleOutcome::Removed));
        let owner = Some(WatchlistOwner::User(watcher.id));
        assert!(!is_watched(store.as_ref(), owner, listing.id).await.unwrap());
    }

    #[tokio::test]
    async fn anonymous_toggle_creates_guest() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let listing = seed_listing(&store, &owner, "Vintage Clock", now).await;

        let result = toggle(&store, &listing.slug, &Client::Anonymous, now)
            .await
            .unwrap();
        let guest_id = result.owner.guest_id().expect("guest owner");
        assert!(store.find_guest(guest_id).await.unwrap().is_some());
        assert_eq!(
            watched_listings(&store, &Client::Guest(guest_id))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let store = MemoryStore::new();
        let err = toggle(&store, "missing", &Client::Anonymous, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Listing does not exist!"));
    }

    #[tokio::test]
    async fn merge_moves_entries_without_duplicates() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let user = seed_user(&store, "buyer@email.com", now).await;
        let clock = seed_listing(&store, &owner, "Vintage Clock", now).await;
        let lamp = seed_listing(&store, &owner, "Brass Lamp", now).await;
        let guest_id = Uuid::new_v4();
        let guest = Client::Guest(guest_id);
        let member = Client::Authenticated(user.clone());

        toggle(&store, &clock.slug, &guest, now).await.unwrap();
        toggle(&store, &lamp.slug, &guest, now).await.unwrap();
        toggle(&store, &clock.slug, &member, now).await.unwrap();

        let moved = merge_guest_into_user(&store, guest_id, user.id).await.unwrap();
        assert_eq!(moved, 1);
        assert!(store.find_guest(guest_id).await.unwrap().is_none());

        let mut slugs: Vec<String> = watched_listings(&store, &member)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.slug)
            .collect();
        slugs.sort();
        let mut expected = vec![clock.slug.clone(), lamp.slug.clone()];
        expected.sort();
        assert_eq!(slugs, expected);
        assert!(watched_listings(&store, &guest).await.unwrap().is_empty());
    }
}
