/// 토큰 서비스
/// 1. 발급 (사용자당 토큰 쌍 1개)
/// 2. 교체 (refresh 토큰 CAS)
/// 3. 검증 (access 토큰)
/// 4. 폐기 (로그아웃)
// region:    --- Imports
use crate::auth::model::{TokenPairRow, User};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::store::Store;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
    pub jti: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
// endregion: --- Claims

// region:    --- Token Service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::minutes(config.refresh_token_expire_minutes),
        }
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind, now: DateTime<Utc>) -> Result<String, AppError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
            jti: Uuid::new_v4(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("토큰 서명 실패: {}", e)))
    }

    fn new_pair(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.sign(user_id, TokenKind::Access, now)?,
            refresh: self.sign(user_id, TokenKind::Refresh, now)?,
        })
    }

    /// 서명, 만료, 종류 확인
    pub fn decode(&self, token: &str, kind: TokenKind) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()?
            .claims;
        (claims.kind == kind).then_some(claims)
    }

    /// 새 토큰 쌍 발급 (기존 쌍은 덮어쓰기)
    pub async fn issue(
        &self,
        store: &dyn Store,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let pair = self.new_pair(user_id, now)?;
        store
            .upsert_token_pair(&TokenPairRow {
                user_id,
                access: pair.access.clone(),
                refresh: pair.refresh.clone(),
            })
            .await?;
        info!("{:<12} --> 토큰 발급: {}", "Auth", user_id);
        Ok(pair)
    }

    /// refresh 토큰으로 토큰 쌍 교체
    pub async fn rotate(
        &self,
        store: &dyn Store,
        refresh: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let claims = self.decode(refresh, TokenKind::Refresh);

        let Some(row) = store.find_token_pair_by_refresh(refresh).await? else {
            // 서명이 유효한데 행이 없으면 이미 교체된 토큰
            return match claims {
                Some(_) => Err(invalid_refresh()),
                None => Err(AppError::NotFound(
                    "Refresh token does not exist".to_string(),
                )),
            };
        };
        let claims = claims.ok_or_else(invalid_refresh)?;
        if claims.sub != row.user_id {
            return Err(invalid_refresh());
        }

        let pair = self.new_pair(row.user_id, now)?;
        let swapped = store
            .swap_token_pair(
                refresh,
                &TokenPairRow {
                    user_id: row.user_id,
                    access: pair.access.clone(),
                    refresh: pair.refresh.clone(),
                },
            )
            .await?;
        if !swapped {
            warn!("{:<12} --> 동시 토큰 교체 감지: {}", "Auth", row.user_id);
            return Err(invalid_refresh());
        }
        info!("{:<12} --> 토큰 교체: {}", "Auth", row.user_id);
        Ok(pair)
    }

    /// access 토큰 검증 후 사용자 조회
    pub async fn validate(&self, store: &dyn Store, access: &str) -> Result<User, AppError> {
        let claims = self
            .decode(access, TokenKind::Access)
            .ok_or_else(invalid_access)?;
        store
            .find_user_by_access(claims.sub, access)
            .await?
            .ok_or_else(invalid_access)
    }

    /// 로그아웃
    pub async fn revoke(&self, store: &dyn Store, user_id: Uuid) -> Result<bool, AppError> {
        let removed = store.delete_token_pair(user_id).await?;
        info!("{:<12} --> 토큰 폐기: {} ({})", "Auth", user_id, removed);
        Ok(removed)
    }
}

fn invalid_refresh() -> AppError {
    AppError::Unauthorized("Refresh token is invalid or expired".to_string())
}

fn invalid_access() -> AppError {
    AppError::Unauthorized("Auth Token is Invalid or Expired!".to_string())
}
// endregion: --- Token Service
