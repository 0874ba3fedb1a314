// region:    --- Imports
use super::{ApiResponse, AppJson};
use crate::auth::commands::{
    self, EmailCommand, LoginCommand, RefreshCommand, RegisterCommand, ResendOutcome,
    SetNewPasswordCommand, VerifyEmailCommand,
};
use crate::auth::identity::{AuthUser, Client};
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Auth Handlers
#[derive(Serialize)]
struct EmailData {
    email: String,
}

/// 회원 가입
pub async fn register(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<RegisterCommand>,
) -> Result<Response, AppError> {
    info!("{:<12} --> 회원 가입 요청: {}", "Handler", cmd.email);
    let user = commands::handle_register(&state, cmd, Utc::now()).await?;
    Ok(
        ApiResponse::success("Registration successful", EmailData { email: user.email })
            .with_status(StatusCode::CREATED),
    )
}

/// 이메일 인증
pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<VerifyEmailCommand>,
) -> Result<impl IntoResponse, AppError> {
    let message = if commands::handle_verify_email(&state, cmd, Utc::now()).await? {
        "Account verification successful"
    } else {
        "Email already verified"
    };
    Ok(ApiResponse::message(message))
}

/// 인증 메일 재발송
pub async fn resend_verification_email(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<EmailCommand>,
) -> Result<impl IntoResponse, AppError> {
    let message = match commands::handle_resend_verification(&state, cmd, Utc::now()).await? {
        ResendOutcome::Sent => "Verification email sent",
        ResendOutcome::AlreadyVerified => "Email already verified",
    };
    Ok(ApiResponse::message(message))
}

/// 비밀번호 재설정 코드 발송
pub async fn send_password_reset_otp(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<EmailCommand>,
) -> Result<impl IntoResponse, AppError> {
    commands::handle_send_password_reset(&state, cmd, Utc::now()).await?;
    Ok(ApiResponse::message("Password otp sent"))
}

/// 새 비밀번호 설정
pub async fn set_new_password(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<SetNewPasswordCommand>,
) -> Result<impl IntoResponse, AppError> {
    commands::handle_set_new_password(&state, cmd, Utc::now()).await?;
    Ok(ApiResponse::message("Password reset successful"))
}

/// 로그인
pub async fn login(
    State(state): State<AppState>,
    client: Client,
    AppJson(cmd): AppJson<LoginCommand>,
) -> Result<Response, AppError> {
    info!("{:<12} --> 로그인 요청: {}", "Handler", cmd.email);
    let pair = commands::handle_login(&state, &client, cmd, Utc::now()).await?;
    Ok(ApiResponse::success("Login successful", pair).with_status(StatusCode::CREATED))
}

/// 토큰 교체
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(cmd): AppJson<RefreshCommand>,
) -> Result<Response, AppError> {
    let pair = commands::handle_refresh(&state, cmd, Utc::now()).await?;
    Ok(ApiResponse::success("Tokens refresh successful", pair).with_status(StatusCode::CREATED))
}

/// 로그아웃
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    commands::handle_logout(&state, &user).await?;
    Ok(ApiResponse::message("Logout successful"))
}
// endregion: --- Auth Handlers
