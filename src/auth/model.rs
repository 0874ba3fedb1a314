use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// 사용자 모델
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub avatar_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// 게스트 사용자 모델 (클라이언트가 생성한 UUID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct GuestUser {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

// 토큰 쌍 모델 (사용자당 1행)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TokenPairRow {
    pub user_id: Uuid,
    pub access: String,
    pub refresh: String,
}

// 일회용 코드 모델 (사용자당 1행)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Otp {
    pub user_id: Uuid,
    pub code: i32,
    pub issued_at: DateTime<Utc>,
}
