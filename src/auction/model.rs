use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 파일 모델 (오브젝트 스토리지의 이미지)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct File {
    pub id: Uuid,
    pub resource_type: String,
}

// 카테고리 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    #[serde(skip)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

// 경매 상품 모델
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub auctioneer_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// None이면 "other" 카테고리
    pub category_id: Option<Uuid>,
    pub price: Decimal,
    pub closing_date: DateTime<Utc>,
    /// 저장된 활성 플래그 (실제 활성 여부는 lifecycle::derive_view)
    pub active: bool,
    pub image_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
