/// 서비스 설정
/// 프로세스 시작 시 한 번 생성되어 AppState를 통해 각 컴포넌트에 주입된다.
// region:    --- Imports
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Config
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 토큰 및 일회용 코드 설정
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
    pub email_otp_expire_seconds: i64,
}

/// SMTP 설정 (host가 비어 있으면 메일 발송 생략)
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub sender_email: String,
    pub sender_password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// 없으면 인메모리 저장소로 실행
    pub database_url: Option<String>,
    pub server_addr: String,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub media_base_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub close_sweep_interval: Duration,
}

impl Config {
    /// 환경 변수(.env 포함)에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = get("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        Ok(Self {
            database_url: get("DATABASE_URL"),
            server_addr: get("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            auth: AuthConfig {
                secret_key,
                access_token_expire_minutes: parse_or(
                    "ACCESS_TOKEN_EXPIRE_MINUTES",
                    get("ACCESS_TOKEN_EXPIRE_MINUTES"),
                    30,
                )?,
                refresh_token_expire_minutes: parse_or(
                    "REFRESH_TOKEN_EXPIRE_MINUTES",
                    get("REFRESH_TOKEN_EXPIRE_MINUTES"),
                    1440,
                )?,
                email_otp_expire_seconds: parse_or(
                    "EMAIL_OTP_EXPIRE_SECONDS",
                    get("EMAIL_OTP_EXPIRE_SECONDS"),
                    900,
                )?,
            },
            mail: MailConfig {
                sender_email: get("MAIL_SENDER_EMAIL").unwrap_or_default(),
                sender_password: get("MAIL_SENDER_PASSWORD").unwrap_or_default(),
                host: get("MAIL_SENDER_HOST").unwrap_or_default(),
                port: parse_or("MAIL_SENDER_PORT", get("MAIL_SENDER_PORT"), 587)?,
            },
            media_base_url: get("MEDIA_BASE_URL")
                .unwrap_or_else(|| "https://media.bidout.local".to_string()),
            cors_allowed_origins: parse_origins(&get("CORS_ALLOWED_ORIGINS").unwrap_or_default()),
            close_sweep_interval: sweep_interval(get("CLOSE_SWEEP_INTERVAL_SECONDS"))?,
        })
    }
}

/// 스케줄러 주기 (0초는 허용하지 않음)
fn sweep_interval(raw: Option<String>) -> Result<Duration, ConfigError> {
    const NAME: &str = "CLOSE_SWEEP_INTERVAL_SECONDS";
    match parse_or(NAME, raw, 30u64)? {
        0 => Err(ConfigError::Invalid {
            name: NAME,
            value: "0".to_string(),
        }),
        seconds => Ok(Duration::from_secs(seconds)),
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
// endregion: --- Config

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[("SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.auth.access_token_expire_minutes, 30);
        assert_eq!(config.auth.refresh_token_expire_minutes, 1440);
        assert_eq!(config.auth.email_otp_expire_seconds, 900);
        assert_eq!(config.server_addr, "0.0.0.0:8000");
        assert!(config.database_url.is_none());
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn requires_secret_key() {
        let err = Config::from_lookup(lookup(&[("SECRET_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SECRET_KEY"));
    }

    #[test]
    fn rejects_non_numeric_expiry() {
        let err = Config::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("EMAIL_OTP_EXPIRE_SECONDS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "EMAIL_OTP_EXPIRE_SECONDS",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn rejects_zero_sweep_interval() {
        let err = Config::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("CLOSE_SWEEP_INTERVAL_SECONDS", "0"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "CLOSE_SWEEP_INTERVAL_SECONDS",
                value: "0".to_string()
            }
        );

        let config = Config::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("CLOSE_SWEEP_INTERVAL_SECONDS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.close_sweep_interval, Duration::from_secs(5));
    }

    #[test]
    fn splits_cors_origins() {
        let config = Config::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,,"),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
