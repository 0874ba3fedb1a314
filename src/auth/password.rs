// region:    --- Imports
use crate::error::AppError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

// endregion: --- Imports

// region:    --- Passwords
/// argon2 비밀번호 해시
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Default for Passwords {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Passwords {
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("비밀번호 해시 실패: {}", e)))
    }

    /// 저장된 해시가 손상된 경우도 불일치로 처리
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        PasswordHash::new(password_hash)
            .map(|parsed| {
                self.argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
// endregion: --- Passwords
