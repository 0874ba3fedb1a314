// region:    --- Imports
use crate::auction::lifecycle::assign_unique_slug;
use crate::auction::model::{File, Listing};
use crate::auth::model::User;
use crate::auth::password::Passwords;
use crate::config::{AuthConfig, Config, MailConfig};
use crate::error::AppError;
use crate::mailer::{EmailKind, Mailer, Recipient};
use crate::state::AppState;
use crate::store::{MemoryStore, SlugScope, Store};
use argon2::Params;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;

// endregion: --- Imports

pub const TEST_PASSWORD: &str = "testpassword";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "test-secret".to_string(),
        access_token_expire_minutes: 30,
        refresh_token_expire_minutes: 1440,
        email_otp_expire_seconds: 900,
    }
}

pub fn passwords() -> Passwords {
    Passwords::new(Params::new(8, 1, 1, None).unwrap())
}

/// 발송 내역을 기록하는 메일러
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(Recipient, EmailKind)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &Recipient, kind: &EmailKind) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((to.clone(), kind.clone()));
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        server_addr: "127.0.0.1:0".to_string(),
        auth: auth_config(),
        mail: MailConfig::default(),
        media_base_url: "https://media.test".to_string(),
        cors_allowed_origins: Vec::new(),
        close_sweep_interval: StdDuration::from_secs(30),
    }
}

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let (state, store, _) = test_state_with_mailer();
    (state, store)
}

pub fn test_state_with_mailer() -> (AppState, Arc<MemoryStore>, Arc<RecordingMailer>) {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(test_config(), store.clone(), mailer.clone())
        .with_passwords(passwords());
    (state, store, mailer)
}

/// 이메일 인증이 끝난 사용자
pub async fn seed_user(store: &dyn Store, email: &str, now: DateTime<Utc>) -> User {
    let user = User {
        id: Uuid::new_v4(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: passwords().hash(TEST_PASSWORD).unwrap(),
        is_email_verified: true,
        is_superuser: false,
        is_staff: false,
        avatar_id: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await.unwrap();
    user
}

/// 가격 1000.00, 하루 뒤 마감
pub async fn seed_listing(
    store: &dyn Store,
    owner: &User,
    name: &str,
    now: DateTime<Utc>,
) -> Listing {
    let image = File {
        id: Uuid::new_v4(),
        resource_type: "image/png".to_string(),
    };
    store.insert_file(&image).await.unwrap();
    let listing = Listing {
        id: Uuid::new_v4(),
        auctioneer_id: owner.id,
        name: name.to_string(),
        slug: assign_unique_slug(store, SlugScope::Listing, name, None)
            .await
            .unwrap(),
        description: format!("{} description", name),
        category_id: None,
        price: Decimal::new(100_000, 2),
        closing_date: now + Duration::days(1),
        active: true,
        image_id: image.id,
        created_at: now,
        updated_at: now,
    };
    store.insert_listing(&listing).await.unwrap();
    listing
}
