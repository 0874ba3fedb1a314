// region:    --- Imports
use crate::auth::otp::OtpService;
use crate::auth::password::Passwords;
use crate::auth::tokens::TokenService;
use crate::config::Config;
use crate::mailer::Mailer;
use crate::media::MediaUrls;
use crate::store::Store;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- App State
/// 요청 핸들러가 공유하는 서비스 묶음 (불변)
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub otp: OtpService,
    pub passwords: Passwords,
    pub mailer: Arc<dyn Mailer>,
    pub media: MediaUrls,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            tokens: TokenService::new(&config.auth),
            otp: OtpService::new(config.auth.email_otp_expire_seconds),
            passwords: Passwords::default(),
            media: MediaUrls::new(&config.media_base_url),
            store,
            mailer,
            config: Arc::new(config),
        }
    }

    pub fn with_passwords(mut self, passwords: Passwords) -> Self {
        self.passwords = passwords;
        self
    }
}
// endregion: --- App State
