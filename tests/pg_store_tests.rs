//! PostgreSQL 저장소 테스트
//! `DATABASE_URL=... cargo test --test pg_store_tests -- --ignored`
use bidout_auction::auction::model::{File, Listing};
use bidout_auction::auth::identity::Client;
use bidout_auction::auth::model::User;
use bidout_auction::auth::tokens::TokenService;
use bidout_auction::bidding::commands::handle_place_bid;
use bidout_auction::config::AuthConfig;
use bidout_auction::database::DatabaseManager;
use bidout_auction::error::AppError;
use bidout_auction::store::{CredentialStore, ListingStore, PgStore, WatchlistStore};
use bidout_auction::watchlist::{self, ToggleOutcome, WatchlistOwner};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Once};
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

static TRACING: Once = Once::new();
static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// 트레이싱 초기화
fn init_tracing() {
    TRACING.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .without_time()
            .with_target(false)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("트레이싱 구독자 설정 실패");
    });
}

/// 데이터베이스 연결 후 스키마 준비 (테스트 바이너리당 1회)
async fn setup() -> Arc<PgStore> {
    init_tracing();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL이 필요합니다");
    let db = Arc::new(
        DatabaseManager::connect(&url)
            .await
            .expect("데이터베이스 연결 실패"),
    );
    SCHEMA
        .get_or_init(|| async {
            db.initialize_database().await.expect("스키마 생성 실패");
        })
        .await;
    Arc::new(PgStore::new(db))
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn create_user(store: &PgStore, now: DateTime<Utc>) -> User {
    let user = User {
        id: Uuid::new_v4(),
        first_name: "Pg".to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@email.com", unique("user")),
        password_hash: "unused".to_string(),
        is_email_verified: true,
        is_superuser: false,
        is_staff: false,
        avatar_id: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await.expect("사용자 생성 실패");
    user
}

/// 가격 1000.00, 하루 뒤 마감
async fn create_listing(store: &PgStore, owner: &User, now: DateTime<Utc>) -> Listing {
    let image = File {
        id: Uuid::new_v4(),
        resource_type: "image/png".to_string(),
    };
    store.insert_file(&image).await.expect("파일 생성 실패");
    let slug = unique("listing");
    let listing = Listing {
        id: Uuid::new_v4(),
        auctioneer_id: owner.id,
        name: slug.clone(),
        slug,
        description: "Postgres listing".to_string(),
        category_id: None,
        price: Decimal::new(100_000, 2),
        closing_date: now + Duration::days(1),
        active: true,
        image_id: image.id,
        created_at: now,
        updated_at: now,
    };
    store.insert_listing(&listing).await.expect("상품 생성 실패");
    info!("{:<12} --> 테스트 상품 생성: {}", "Test", listing.slug);
    listing
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "pg-secret".to_string(),
        access_token_expire_minutes: 30,
        refresh_token_expire_minutes: 1440,
        email_otp_expire_seconds: 900,
    }
}

/// 서로 다른 금액의 동시 입찰: 최고 금액이 최종 최고가, 확정된 건수만큼만 행이 남는다
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_concurrent_distinct_bids() {
    let store = setup().await;
    let now = Utc::now();
    let owner = create_user(&store, now).await;
    let listing = create_listing(&store, &owner, now).await;

    let mut handles = Vec::new();
    for i in 1..=20i64 {
        let bidder = create_user(&store, now).await;
        let store = Arc::clone(&store);
        let slug = listing.slug.clone();
        handles.push(tokio::spawn(async move {
            let amount = Decimal::new(1_000 + i, 0);
            (
                amount,
                handle_place_bid(store.as_ref(), &slug, bidder.id, amount, now).await,
            )
        }));
    }

    let mut accepted = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            (amount, Ok(_)) => accepted.push(amount),
            (_, Err(AppError::BadRequest(_))) => {}
            (amount, Err(e)) => panic!("입찰 {} 실패: {:?}", amount, e),
        }
    }

    let summary = store.bid_summary(listing.id).await.unwrap();
    assert!(accepted.contains(&Decimal::new(1_020, 0)));
    assert_eq!(summary.highest, Decimal::new(1_020, 0));
    assert_eq!(summary.count, accepted.len() as i64);
}

/// 같은 금액의 동시 입찰은 한 건만 확정
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_concurrent_identical_bids() {
    let store = setup().await;
    let now = Utc::now();
    let owner = create_user(&store, now).await;
    let listing = create_listing(&store, &owner, now).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let bidder = create_user(&store, now).await;
        let store = Arc::clone(&store);
        let slug = listing.slug.clone();
        handles.push(tokio::spawn(async move {
            let amount = Decimal::new(150_000, 2);
            handle_place_bid(store.as_ref(), &slug, bidder.id, amount, now).await
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    let summary = store.bid_summary(listing.id).await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.highest, Decimal::new(150_000, 2));
}

/// NUMERIC(10, 2) 범위를 넘는 입찰은 데이터베이스 오류가 아닌 검증 오류
#[tokio::test]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_out_of_range_bid_is_validation_error() {
    let store = setup().await;
    let now = Utc::now();
    let owner = create_user(&store, now).await;
    let bidder = create_user(&store, now).await;
    let listing = create_listing(&store, &owner, now).await;

    let too_big = Decimal::new(10_000_000_000, 2);
    let err = handle_place_bid(store.as_ref(), &listing.slug, bidder.id, too_big, now)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { fields, .. } if fields.contains_key("amount")));

    let max = Decimal::new(9_999_999_999, 2);
    let (_, bid) = handle_place_bid(store.as_ref(), &listing.slug, bidder.id, max, now)
        .await
        .unwrap();
    assert_eq!(bid.amount, max);
}

/// 교체된 refresh 토큰은 재사용 불가, 동시 교체는 한 건만 성공
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_refresh_rotation() {
    let store = setup().await;
    let tokens = TokenService::new(&auth_config());
    let now = Utc::now();
    let user = create_user(&store, now).await;

    let first = tokens.issue(store.as_ref(), user.id, now).await.unwrap();
    let second = tokens
        .rotate(store.as_ref(), &first.refresh, now)
        .await
        .unwrap();

    let reused = tokens.rotate(store.as_ref(), &first.refresh, now).await;
    assert!(matches!(reused, Err(AppError::Unauthorized(_))));
    assert!(tokens.validate(store.as_ref(), &first.access).await.is_err());
    let validated = tokens
        .validate(store.as_ref(), &second.access)
        .await
        .unwrap();
    assert_eq!(validated.id, user.id);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let store = Arc::clone(&store);
        let tokens = tokens.clone();
        let refresh = second.refresh.clone();
        handles.push(tokio::spawn(async move {
            tokens.rotate(store.as_ref(), &refresh, Utc::now()).await
        }));
    }
    let mut rotated = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            rotated += 1;
        }
    }
    assert_eq!(rotated, 1);
}

/// 게스트 관심 목록 병합: 중복은 한 번만 남고 게스트는 삭제
#[tokio::test]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_guest_merge_with_duplicates() {
    let store = setup().await;
    let now = Utc::now();
    let owner = create_user(&store, now).await;
    let user = create_user(&store, now).await;
    let clock = create_listing(&store, &owner, now).await;
    let lamp = create_listing(&store, &owner, now).await;
    let guest_id = Uuid::new_v4();
    let guest = Client::Guest(guest_id);
    let member = Client::Authenticated(user.clone());

    watchlist::toggle(store.as_ref(), &clock.slug, &guest, now)
        .await
        .unwrap();
    watchlist::toggle(store.as_ref(), &lamp.slug, &guest, now)
        .await
        .unwrap();
    watchlist::toggle(store.as_ref(), &clock.slug, &member, now)
        .await
        .unwrap();

    let moved = watchlist::merge_guest_into_user(store.as_ref(), guest_id, user.id)
        .await
        .unwrap();
    assert_eq!(moved, 1);
    assert!(store.find_guest(guest_id).await.unwrap().is_none());

    let watched = store
        .watched_listings(WatchlistOwner::User(user.id))
        .await
        .unwrap();
    let mut ids: Vec<Uuid> = watched.iter().map(|l| l.id).collect();
    ids.sort();
    let mut expected = vec![clock.id, lamp.id];
    expected.sort();
    assert_eq!(ids, expected);
    assert!(store
        .watched_listings(WatchlistOwner::Guest(guest_id))
        .await
        .unwrap()
        .is_empty());
}

/// 같은 사용자의 동시 토글 두 건은 서로 상쇄
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "DATABASE_URL이 필요한 PostgreSQL 테스트"]
async fn test_concurrent_toggles_cancel_out() {
    let store = setup().await;
    let now = Utc::now();
    let owner = create_user(&store, now).await;
    let watcher = create_user(&store, now).await;
    let listing = create_listing(&store, &owner, now).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = Arc::clone(&store);
        let slug = listing.slug.clone();
        let client = Client::Authenticated(watcher.clone());
        handles.push(tokio::spawn(async move {
            watchlist::toggle(store.as_ref(), &slug, &client, now).await
        }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap().outcome);
    }

    assert!(outcomes.contains(&ToggleOutcome::Added));
    assert!(outcomes.contains(&ToggleOutcome::Removed));
    let owner = WatchlistOwner::User(watcher.id);
    assert!(store.find_watch(owner, listing.id).await.unwrap().is_none());
}
