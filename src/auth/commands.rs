/// 계정 커맨드 처리
/// 1. 회원 가입, 이메일 인증, 인증 메일 재발송
/// 2. 비밀번호 재설정
/// 3. 로그인 (게스트 관심 목록 병합), 토큰 교체, 로그아웃
// region:    --- Imports
use crate::auth::identity::Client;
use crate::auth::model::User;
use crate::auth::tokens::TokenPair;
use crate::error::AppError;
use crate::mailer::{dispatch, EmailKind, Recipient};
use crate::state::AppState;
use crate::watchlist;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// endregion: --- Imports

// region:    --- Commands
fn accepted_terms(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        let message = "You must agree to terms and conditions";
        Err(ValidationError::new("terms").with_message(message.into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterCommand {
    #[validate(length(min = 1, max = 50, message = "Must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "accepted_terms"))]
    pub terms_agreement: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailCommand {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyEmailCommand {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub otp: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetNewPasswordCommand {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub otp: i32,
    #[validate(length(min = 8, message = "Must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginCommand {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshCommand {
    pub refresh: String,
}

/// 인증 메일 재발송 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    AlreadyVerified,
}

fn recipient(user: &User) -> Recipient {
    Recipient {
        email: user.email.clone(),
        name: user.full_name(),
    }
}

async fn user_by_email(state: &AppState, email: &str) -> Result<User, AppError> {
    state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("Incorrect Email".to_string()))
}

/// 코드 발급 후 메일 발송 (응답은 기다리지 않음)
async fn send_otp_mail(
    state: &AppState,
    user: &User,
    now: DateTime<Utc>,
    kind: fn(i32) -> EmailKind,
) -> Result<(), AppError> {
    let otp = state.otp.issue(state.store.as_ref(), user.id, now).await?;
    dispatch(state.mailer.clone(), recipient(user), kind(otp));
    Ok(())
}

/// 회원 가입
pub async fn handle_register(
    state: &AppState,
    cmd: RegisterCommand,
    now: DateTime<Utc>,
) -> Result<User, AppError> {
    cmd.validate()?;
    let store = state.store.as_ref();
    if store.find_user_by_email(&cmd.email).await?.is_some() {
        return Err(AppError::invalid_field("email", "Email already registered!"));
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: cmd.first_name,
        last_name: cmd.last_name,
        email: cmd.email,
        password_hash: state.passwords.hash(&cmd.password)?,
        is_email_verified: false,
        is_superuser: false,
        is_staff: false,
        avatar_id: None,
        created_at: now,
        updated_at: now,
    };
    match store.insert_user(&user).await {
        Ok(()) => {}
        Err(AppError::Conflict(_)) => {
            return Err(AppError::invalid_field("email", "Email already registered!"))
        }
        Err(e) => return Err(e),
    }
    info!("{:<12} --> 회원 가입: {}", "Auth", user.email);

    send_otp_mail(state, &user, now, |otp| EmailKind::Activate { otp }).await?;
    Ok(user)
}

/// 이메일 인증 (이미 인증된 경우 false)
pub async fn handle_verify_email(
    state: &AppState,
    cmd: VerifyEmailCommand,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    cmd.validate()?;
    let store = state.store.as_ref();
    let mut user = user_by_email(state, &cmd.email).await?;
    if user.is_email_verified {
        return Ok(false);
    }

    state.otp.verify(store, user.id, cmd.otp, now).await?;
    state.otp.clear(store, user.id).await?;

    user.is_email_verified = true;
    user.updated_at = now;
    store.update_user(&user).await?;
    info!("{:<12} --> 이메일 인증 완료: {}", "Auth", user.email);

    dispatch(state.mailer.clone(), recipient(&user), EmailKind::Welcome);
    Ok(true)
}

/// 인증 메일 재발송
pub async fn handle_resend_verification(
    state: &AppState,
    cmd: EmailCommand,
    now: DateTime<Utc>,
) -> Result<ResendOutcome, AppError> {
    cmd.validate()?;
    let user = user_by_email(state, &cmd.email).await?;
    if user.is_email_verified {
        return Ok(ResendOutcome::AlreadyVerified);
    }
    send_otp_mail(state, &user, now, |otp| EmailKind::Activate { otp }).await?;
    Ok(ResendOutcome::Sent)
}

/// 비밀번호 재설정 코드 발송
pub async fn handle_send_password_reset(
    state: &AppState,
    cmd: EmailCommand,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    cmd.validate()?;
    let user = user_by_email(state, &cmd.email).await?;
    send_otp_mail(state, &user, now, |otp| EmailKind::Reset { otp }).await
}

/// 새 비밀번호 설정
pub async fn handle_set_new_password(
    state: &AppState,
    cmd: SetNewPasswordCommand,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    cmd.validate()?;
    let store = state.store.as_ref();
    let mut user = user_by_email(state, &cmd.email).await?;

    state.otp.verify(store, user.id, cmd.otp, now).await?;
    state.otp.clear(store, user.id).await?;

    user.password_hash = state.passwords.hash(&cmd.password)?;
    user.updated_at = now;
    store.update_user(&user).await?;
    info!("{:<12} --> 비밀번호 재설정: {}", "Auth", user.email);

    dispatch(state.mailer.clone(), recipient(&user), EmailKind::ResetSuccess);
    Ok(())
}

/// 로그인 (게스트였다면 관심 목록 병합)
pub async fn handle_login(
    state: &AppState,
    client: &Client,
    cmd: LoginCommand,
    now: DateTime<Utc>,
) -> Result<TokenPair, AppError> {
    cmd.validate()?;
    let store = state.store.as_ref();
    let user = store
        .find_user_by_email(&cmd.email)
        .await?
        .filter(|user| state.passwords.verify(&cmd.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid Credentials".to_string()))?;
    if !user.is_email_verified {
        return Err(AppError::Unauthorized("Verify your email first".to_string()));
    }

    let pair = state.tokens.issue(store, user.id, now).await?;
    if let Client::Guest(guest_id) = client {
        watchlist::merge_guest_into_user(store, *guest_id, user.id).await?;
    }
    info!("{:<12} --> 로그인: {}", "Auth", user.email);
    Ok(pair)
}

pub async fn handle_refresh(
    state: &AppState,
    cmd: RefreshCommand,
    now: DateTime<Utc>,
) -> Result<TokenPair, AppError> {
    state
        .tokens
        .rotate(state.store.as_ref(), &cmd.refresh, now)
        .await
}

pub async fn handle_logout(state: &AppState, user: &User) -> Result<(), AppError> {
    state.tokens.revoke(state.store.as_ref(), user.id).await?;
    Ok(())
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        seed_listing, seed_user, test_state_with_mailer, RecordingMailer, TEST_PASSWORD,
    };
    use crate::watchlist::{toggle, watched_listings};
    use std::time::Duration as StdDuration;

    fn register_cmd(email: &str) -> RegisterCommand {
        RegisterCommand {
            first_name: "Test".to_string(),
            last_name: "Name".to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            terms_agreement: true,
        }
    }

    /// 백그라운드 발송이 끝날 때까지 대기
    async fn wait_for_mail(mailer: &RecordingMailer, count: usize) -> Vec<EmailKind> {
        for _ in 0..100 {
            let sent = mailer.sent.lock().unwrap().clone();
            if sent.len() >= count {
                return sent.into_iter().map(|(_, kind)| kind).collect();
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        panic!("mail was not dispatched");
    }

    #[tokio::test]
    async fn register_then_verify_email() {
        let (state, _, mailer) = test_state_with_mailer();
        let now = Utc::now();
        handle_register(&state, register_cmd("new@email.com"), now)
            .await
            .unwrap();

        let sent = wait_for_mail(&mailer, 1).await;
        let EmailKind::Activate { otp } = sent[0] else {
            panic!("expected activation mail");
        };

        let wrong = handle_verify_email(
            &state,
            VerifyEmailCommand {
                email: "new@email.com".to_string(),
                otp: if otp == 100_000 { 100_001 } else { otp - 1 },
            },
            now,
        )
        .await;
        assert!(matches!(wrong, Err(AppError::NotFound(m)) if m == "Incorrect Otp"));

        let verified = handle_verify_email(
            &state,
            VerifyEmailCommand {
                email: "new@email.com".to_string(),
                otp,
            },
            now,
        )
        .await
        .unwrap();
        assert!(verified);
        assert!(state.store.find_otp(
            state.store.find_user_by_email("new@email.com").await.unwrap().unwrap().id
        ).await.unwrap().is_none());
        assert_eq!(wait_for_mail(&mailer, 2).await[1], EmailKind::Welcome);
    }

    #[tokio::test]
    async fn duplicate_registration_is_invalid_entry() {
        let (state, _, _) = test_state_with_mailer();
        let now = Utc::now();
        handle_register(&state, register_cmd("dup@email.com"), now)
            .await
            .unwrap();
        let err = handle_register(&state, register_cmd("dup@email.com"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { message, fields }
            if message == "Invalid Entry" && fields["email"] == "Email already registered!"));
    }

    #[tokio::test]
    async fn register_requires_terms() {
        let (state, _, _) = test_state_with_mailer();
        let mut cmd = register_cmd("terms@email.com");
        cmd.terms_agreement = false;
        let err = handle_register(&state, cmd, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { fields, .. } if fields.contains_key("terms_agreement")
        ));
    }

    #[tokio::test]
    async fn login_requires_verified_email_and_password() {
        let (state, _, _) = test_state_with_mailer();
        let now = Utc::now();
        handle_register(&state, register_cmd("login@email.com"), now)
            .await
            .unwrap();

        let unverified = handle_login(
            &state,
            &Client::Anonymous,
            LoginCommand {
                email: "login@email.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
            now,
        )
        .await;
        assert!(matches!(
            unverified,
            Err(AppError::Unauthorized(m)) if m == "Verify your email first"
        ));

        let wrong = handle_login(
            &state,
            &Client::Anonymous,
            LoginCommand {
                email: "login@email.com".to_string(),
                password: "wrongpassword".to_string(),
            },
            now,
        )
        .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(m)) if m == "Invalid Credentials"));
    }

    #[tokio::test]
    async fn login_merges_guest_watchlist() {
        let (state, store, _) = test_state_with_mailer();
        let now = Utc::now();
        let owner = seed_user(store.as_ref(), "owner@email.com", now).await;
        let user = seed_user(store.as_ref(), "buyer@email.com", now).await;
        let listing = seed_listing(store.as_ref(), &owner, "Vintage Clock", now).await;
        let guest = Client::Guest(Uuid::new_v4());
        toggle(store.as_ref(), &listing.slug, &guest, now).await.unwrap();

        handle_login(
            &state,
            &guest,
            LoginCommand {
                email: user.email.clone(),
                password: TEST_PASSWORD.to_string(),
            },
            now,
        )
        .await
        .unwrap();

        let watched = watched_listings(store.as_ref(), &Client::Authenticated(user))
            .await
            .unwrap();
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].id, listing.id);
    }

    #[tokio::test]
    async fn reset_password_flow() {
        let (state, store, mailer) = test_state_with_mailer();
        let now = Utc::now();
        let user = seed_user(store.as_ref(), "reset@email.com", now).await;

        let unknown = handle_send_password_reset(
            &state,
            EmailCommand {
                email: "nobody@email.com".to_string(),
            },
            now,
        )
        .await;
        assert!(matches!(unknown, Err(AppError::NotFound(m)) if m == "Incorrect Email"));

        handle_send_password_reset(
            &state,
            EmailCommand {
                email: user.email.clone(),
            },
            now,
        )
        .await
        .unwrap();
        let EmailKind::Reset { otp } = wait_for_mail(&mailer, 1).await[0] else {
            panic!("expected reset mail");
        };

        let cmd = SetNewPasswordCommand {
            email: user.email.clone(),
            otp,
            password: "brandnewpassword".to_string(),
        };
        handle_set_new_password(&state, cmd.clone(), now).await.unwrap();
        // 같은 코드는 다시 사용할 수 없음
        assert!(handle_set_new_password(&state, cmd, now).await.is_err());

        let pair = handle_login(
            &state,
            &Client::Anonymous,
            LoginCommand {
                email: user.email.clone(),
                password: "brandnewpassword".to_string(),
            },
            now,
        )
        .await;
        assert!(pair.is_ok());
    }

    #[tokio::test]
    async fn resend_reports_already_verified() {
        let (state, store, _) = test_state_with_mailer();
        let now = Utc::now();
        let user = seed_user(store.as_ref(), "verified@email.com", now).await;
        let outcome = handle_resend_verification(&state, EmailCommand { email: user.email }, now)
            .await
            .unwrap();
        assert_eq!(outcome, ResendOutcome::AlreadyVerified);
    }
}
