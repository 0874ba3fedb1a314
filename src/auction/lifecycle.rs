/// 상품 수명 주기
/// 1. 저장된 값에서 파생 상태 계산 (활성 여부, 남은 시간, 최고 입찰가)
/// 2. slug 고유성 보장
/// 3. 카테고리 해석 ("other"는 카테고리 없음)
// region:    --- Imports
use crate::auction::model::{Category, Listing};
use crate::error::AppError;
use crate::store::{BidSummary, SlugScope, Store};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Derived State
pub const OTHER_CATEGORY_SLUG: &str = "other";
pub const OTHER_CATEGORY_NAME: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListingState {
    pub active: bool,
    pub time_left_seconds: i64,
    pub highest_bid: Decimal,
    pub bids_count: i64,
}

impl ListingState {
    pub fn is_closed(&self) -> bool {
        !self.active
    }
}

/// 파생 상태 계산 (남은 시간은 음수일 수 있음)
pub fn derive_view(listing: &Listing, summary: &BidSummary, now: DateTime<Utc>) -> ListingState {
    let time_left_seconds = (listing.closing_date - now).num_seconds();
    ListingState {
        active: listing.active && time_left_seconds > 0,
        time_left_seconds,
        highest_bid: summary.highest,
        bids_count: summary.count,
    }
}

pub async fn current_state(
    store: &dyn Store,
    listing: &Listing,
    now: DateTime<Utc>,
) -> Result<ListingState, AppError> {
    let summary = store.bid_summary(listing.id).await?;
    Ok(derive_view(listing, &summary, now))
}
// endregion: --- Derived State

// region:    --- Money
/// NUMERIC(10, 2) 컬럼의 상한 (미만이어야 함)
pub fn amount_limit() -> Decimal {
    Decimal::new(100_000_000, 0)
}

/// 소수 둘째 자리 반올림 (0.5는 0에서 먼 쪽, PostgreSQL NUMERIC과 동일)
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 반올림한 금액이 컬럼에 저장 가능한지
pub fn fits_amount_column(amount: Decimal) -> bool {
    round_amount(amount) < amount_limit()
}
// endregion: --- Money

// region:    --- Slugs
/// 소문자 영숫자와 '-'로 구성된 slug
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// 다른 행이 쓰고 있지 않은 slug를 찾을 때까지 무작위 접미사를 붙여 재시도
pub async fn assign_unique_slug(
    store: &dyn Store,
    scope: SlugScope,
    name: &str,
    existing_id: Option<Uuid>,
) -> Result<String, AppError> {
    let base = slugify(name);
    let mut candidate = if base.is_empty() {
        random_suffix(4)
    } else {
        base.clone()
    };
    loop {
        match store.slug_owner(scope, &candidate).await? {
            Some(owner) if Some(owner) != existing_id => {
                debug!("{:<12} --> slug 충돌: {}", "Lifecycle", candidate);
                candidate = if base.is_empty() {
                    random_suffix(4)
                } else {
                    format!("{}-{}", base, random_suffix(4))
                };
            }
            _ => return Ok(candidate),
        }
    }
}
// endregion: --- Slugs

// region:    --- Categories
/// "other"는 None, 그 외에는 존재하는 카테고리여야 함
pub async fn resolve_category(store: &dyn Store, slug: &str) -> Result<Option<Category>, AppError> {
    if slug == OTHER_CATEGORY_SLUG {
        return Ok(None);
    }
    store
        .find_category_by_slug(slug)
        .await?
        .map(Some)
        .ok_or_else(|| AppError::invalid_field("category", "Invalid category!"))
}

pub async fn category_name(
    store: &dyn Store,
    category_id: Option<Uuid>,
) -> Result<String, AppError> {
    Ok(match category_id {
        Some(id) => store
            .find_category(id)
            .await?
            .map(|c| c.name)
            .unwrap_or_else(|| OTHER_CATEGORY_NAME.to_string()),
        None => OTHER_CATEGORY_NAME.to_string(),
    })
}
// endregion: --- Categories

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{seed_listing, seed_user};
    use chrono::Duration;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Vintage   Clock!! 1920 "), "vintage-clock-1920");
        assert_eq!(slugify("Brass_Lamp"), "brass-lamp");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let dec = |v: &str| v.parse::<Decimal>().unwrap();
        assert_eq!(round_amount(dec("1000.005")), dec("1000.01"));
        assert_eq!(round_amount(dec("1000.015")), dec("1000.02"));
        assert_eq!(round_amount(dec("1000.004")), dec("1000.00"));
    }

    #[test]
    fn amount_column_upper_bound() {
        let dec = |v: &str| v.parse::<Decimal>().unwrap();
        assert!(fits_amount_column(dec("99999999.99")));
        assert!(fits_amount_column(dec("99999999.994")));
        assert!(!fits_amount_column(dec("99999999.995")));
        assert!(!fits_amount_column(dec("100000000.00")));
    }

    #[tokio::test]
    async fn colliding_slug_gets_random_suffix() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let first = seed_listing(&store, &owner, "Vintage Clock", now).await;
        assert_eq!(first.slug, "vintage-clock");

        let slug = assign_unique_slug(&store, SlugScope::Listing, "Vintage Clock", None)
            .await
            .unwrap();
        assert!(slug.starts_with("vintage-clock-"));
        assert_eq!(slug.len(), "vintage-clock-".len() + 4);

        // 자기 자신의 slug는 충돌이 아님
        let same = assign_unique_slug(&store, SlugScope::Listing, "Vintage Clock", Some(first.id))
            .await
            .unwrap();
        assert_eq!(same, "vintage-clock");
    }

    #[tokio::test]
    async fn derived_state_closes_after_deadline() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = seed_user(&store, "owner@email.com", now).await;
        let listing = seed_listing(&store, &owner, "Vintage Clock", now).await;

        let open = current_state(&store, &listing, now).await.unwrap();
        assert!(open.active);
        assert_eq!(open.highest_bid, Decimal::ZERO);
        assert_eq!(open.bids_count, 0);

        let later = listing.closing_date + Duration::seconds(5);
        let closed = derive_view(&listing, &BidSummary::default(), later);
        assert!(closed.is_closed());
        assert_eq!(closed.time_left_seconds, -5);

        let mut deactivated = listing.clone();
        deactivated.active = false;
        assert!(derive_view(&deactivated, &BidSummary::default(), now).is_closed());
    }

    #[tokio::test]
    async fn other_category_maps_to_none() {
        let store = MemoryStore::new();
        assert!(resolve_category(&store, "other").await.unwrap().is_none());
        let err = resolve_category(&store, "nope").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { fields, .. } if fields["category"] == "Invalid category!"
        ));
    }
}
