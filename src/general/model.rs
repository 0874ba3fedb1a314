use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 사이트 정보 모델 (단일 행)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteDetail {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub fb: String,
    pub tw: String,
    pub wh: String,
    pub ig: String,
}

impl Default for SiteDetail {
    fn default() -> Self {
        Self {
            name: "Bidout Auction House".to_string(),
            email: "support@bidout.local".to_string(),
            phone: "+10000000000".to_string(),
            address: "234, Lagos, Nigeria".to_string(),
            fb: "https://facebook.com".to_string(),
            tw: "https://twitter.com".to_string(),
            wh: "https://wa.me".to_string(),
            ig: "https://instagram.com".to_string(),
        }
    }
}

// 뉴스레터 구독자 모델
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    /// 외부 메일 도구로 내보냈는지
    pub exported: bool,
    pub created_at: DateTime<Utc>,
}

// 후기 모델
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    /// 노출 여부 (관리자가 승인한 후기만 노출)
    pub shown: bool,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
