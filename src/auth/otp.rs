/// 일회용 코드 서비스 (이메일 인증, 비밀번호 재설정)
// region:    --- Imports
use crate::auth::model::Otp;
use crate::error::AppError;
use crate::store::Store;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Otp Service
#[derive(Debug, Clone)]
pub struct OtpService {
    ttl_seconds: i64,
}

impl OtpService {
    pub fn new(ttl_seconds: i64) -> Self {
        Self { ttl_seconds }
    }

    /// 새 6자리 코드 발급 (기존 코드는 덮어쓰기)
    pub async fn issue(
        &self,
        store: &dyn Store,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i32, AppError> {
        let code = rand::thread_rng().gen_range(100_000..=999_999);
        store
            .upsert_otp(&Otp {
                user_id,
                code,
                issued_at: now,
            })
            .await?;
        info!("{:<12} --> 일회용 코드 발급: {}", "Auth", user_id);
        Ok(code)
    }

    /// 코드 확인 (삭제하지 않음; 성공 후 호출자가 clear 호출)
    pub async fn verify(
        &self,
        store: &dyn Store,
        user_id: Uuid,
        code: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let otp = store
            .find_otp(user_id)
            .await?
            .filter(|otp| otp.code == code)
            .ok_or_else(|| AppError::NotFound("Incorrect Otp".to_string()))?;
        if (now - otp.issued_at).num_seconds() > self.ttl_seconds {
            return Err(AppError::Expired("Expired Otp".to_string()));
        }
        Ok(())
    }

    pub async fn clear(&self, store: &dyn Store, user_id: Uuid) -> Result<(), AppError> {
        store.delete_otp(user_id).await
    }
}
// endregion: --- Otp Service
