/// 메일 발송
/// 요청 흐름과 분리되어 tokio 태스크에서 발송되며, 실패는 로그로만 남긴다.
// region:    --- Imports
use crate::config::MailConfig;
use crate::error::AppError;
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Email Kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailKind {
    Activate { otp: i32 },
    Welcome,
    Reset { otp: i32 },
    ResetSuccess,
}

impl EmailKind {
    pub fn subject(&self) -> &'static str {
        match self {
            EmailKind::Activate { .. } => "Activate your account",
            EmailKind::Welcome => "Account verified",
            EmailKind::Reset { .. } => "Reset your password",
            EmailKind::ResetSuccess => "Password reset successfully",
        }
    }

    pub fn body(&self, name: &str) -> String {
        match self {
            EmailKind::Activate { otp } => format!(
                "Hi {name},\n\nThanks for signing up. \
                 Use the code below to verify your email.\n\n{otp}\n"
            ),
            EmailKind::Welcome => {
                format!("Hi {name},\n\nYour account has been verified. Welcome to Bidout!\n")
            }
            EmailKind::Reset { otp } => format!(
                "Hi {name},\n\nUse the code below to set a new password.\n\n{otp}\n"
            ),
            EmailKind::ResetSuccess => {
                format!("Hi {name},\n\nYour password has been changed successfully.\n")
            }
        }
    }
}
// endregion: --- Email Kind

// region:    --- Mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &Recipient, kind: &EmailKind) -> Result<(), AppError>;
}

/// SMTP 메일러 (host가 비어 있으면 발송 생략)
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        if config.host.trim().is_empty() {
            warn!("{:<12} --> SMTP 설정 없음: 메일 발송 생략", "Mailer");
            return Ok(Self {
                transport: None,
                from: None,
            });
        }

        let from = config
            .sender_email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("잘못된 발신 주소: {}", e)))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Internal(format!("SMTP 설정 실패: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Some(transport),
            from: Some(from),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &Recipient, kind: &EmailKind) -> Result<(), AppError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            info!(
                "{:<12} --> 메일 발송 생략: {} ({})",
                "Mailer",
                to.email,
                kind.subject()
            );
            return Ok(());
        };

        let mailbox = to
            .email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("잘못된 수신 주소: {}", e)))?;
        let message = Message::builder()
            .from(from.clone())
            .to(mailbox)
            .subject(kind.subject())
            .header(header::ContentType::TEXT_PLAIN)
            .body(kind.body(&to.name))
            .map_err(|e| AppError::Internal(format!("메일 생성 실패: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("메일 발송 실패: {}", e)))?;
        info!("{:<12} --> 메일 발송: {} ({})", "Mailer", to.email, kind.subject());
        Ok(())
    }
}

/// 백그라운드 발송 (결과를 기다리지 않음)
pub fn dispatch(mailer: Arc<dyn Mailer>, to: Recipient, kind: EmailKind) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &kind).await {
            error!(
                "{:<12} --> 메일 발송 실패: {} ({}): {}",
                "Mailer",
                to.email,
                kind.subject(),
                e
            );
        }
    });
}
// endregion: --- Mailer
