/// 요청 클라이언트 식별
/// 인증 사용자, 게스트(클라이언트가 만든 UUID), 익명 중 하나로 결정된다.
// region:    --- Imports
use crate::auth::model::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::watchlist::WatchlistOwner;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use tracing::debug;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Client
pub const GUEST_HEADER: &str = "guestuserid";

#[derive(Debug, Clone)]
pub enum Client {
    Authenticated(User),
    Guest(Uuid),
    Anonymous,
}

impl Client {
    pub fn watch_owner(&self) -> Option<WatchlistOwner> {
        match self {
            Client::Authenticated(user) => Some(WatchlistOwner::User(user.id)),
            Client::Guest(id) => Some(WatchlistOwner::Guest(*id)),
            Client::Anonymous => None,
        }
    }
}

/// 인증이 필요한 엔드포인트용
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Authorization 헤더의 bearer 토큰
pub fn bearer_token(headers: &HeaderMap) -> Option<Result<&str, ()>> {
    let value = headers.get(header::AUTHORIZATION)?;
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    Some(token.ok_or(()))
}

pub fn guest_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(GUEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// 선택적 인증: 잘못된 토큰은 익명으로 처리, 게스트 헤더는 유효한 토큰이 없을 때만 사용
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Client, AppError> {
    if let Some(Ok(token)) = bearer_token(headers) {
        match state.tokens.validate(state.store.as_ref(), token).await {
            Ok(user) => return Ok(Client::Authenticated(user)),
            Err(AppError::Unauthorized(_)) => {
                debug!("{:<12} --> 잘못된 토큰: 익명으로 처리", "Auth");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(match guest_id(headers) {
        Some(id) => Client::Guest(id),
        None => Client::Anonymous,
    })
}

/// 필수 인증
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    match bearer_token(headers) {
        None => Err(AppError::Unauthorized("Unauthorized User!".to_string())),
        Some(Err(())) => Err(AppError::Unauthorized(
            "Auth Token is Invalid or Expired!".to_string(),
        )),
        Some(Ok(token)) => state.tokens.validate(state.store.as_ref(), token).await,
    }
}
// endregion: --- Client

// region:    --- Extractors
#[axum::async_trait]
impl FromRequestParts<AppState> for Client {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(state, &parts.headers).await
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_user(state, &parts.headers).await.map(AuthUser)
    }
}
// endregion: --- Extractors
