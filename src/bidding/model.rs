use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// 입찰 모델 (입찰자당 상품별 1행, 재입찰 시 금액 덮어쓰기)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 입찰 확정 요청 (비교 기준이 된 최고 입찰가 포함)
#[derive(Debug, Clone)]
pub struct BidAttempt {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub expected_highest: Decimal,
    pub now: DateTime<Utc>,
}

/// 입찰 확정 결과
#[derive(Debug, Clone, PartialEq)]
pub enum BidCommit {
    Accepted(Bid),
    /// 검증 이후 다른 입찰이 먼저 확정됨
    StaleHighestBid,
}
