/// 사이트 공통 서비스
/// 1. 사이트 정보 조회 (없으면 기본값으로 생성)
/// 2. 뉴스레터 구독
// region:    --- Imports
use crate::error::AppError;
use crate::general::model::{SiteDetail, Subscriber};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub mod model;

// endregion: --- Imports

// region:    --- Commands
/// 구독 명령
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeCommand {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// 뉴스레터 구독 (이미 구독 중이면 그대로 성공)
pub async fn subscribe(
    store: &dyn Store,
    cmd: SubscribeCommand,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    cmd.validate()?;
    let subscriber = Subscriber {
        id: Uuid::new_v4(),
        email: cmd.email,
        exported: false,
        created_at: now,
    };
    let created = store.insert_subscriber(&subscriber).await?;
    info!(
        "{:<12} --> 뉴스레터 구독: {} (new={})",
        "General", subscriber.email, created
    );
    Ok(subscriber.email)
}
// endregion: --- Commands

// region:    --- Queries
pub async fn site_detail(store: &dyn Store) -> Result<SiteDetail, AppError> {
    store.site_detail_or_insert(&SiteDetail::default()).await
}
// endregion: --- Queries

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GeneralStore, MemoryStore};

    #[tokio::test]
    async fn site_detail_is_created_once() {
        let store = MemoryStore::new();
        let first = site_detail(&store).await.unwrap();
        assert_eq!(first, SiteDetail::default());

        let custom = SiteDetail {
            name: "Other House".to_string(),
            ..SiteDetail::default()
        };
        // 이미 있으면 전달한 기본값은 무시
        let second = store.site_detail_or_insert(&custom).await.unwrap();
        assert_eq!(second.name, first.name);
    }

    #[tokio::test]
    async fn subscribing_twice_keeps_one_row() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let cmd = SubscribeCommand {
            email: "reader@email.com".to_string(),
        };
        assert_eq!(
            subscribe(&store, cmd.clone(), now).await.unwrap(),
            "reader@email.com"
        );
        subscribe(&store, cmd, now).await.unwrap();

        let duplicate = Subscriber {
            id: Uuid::new_v4(),
            email: "reader@email.com".to_string(),
            exported: false,
            created_at: now,
        };
        assert!(!store.insert_subscriber(&duplicate).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let store = MemoryStore::new();
        let cmd = SubscribeCommand {
            email: "not-an-email".to_string(),
        };
        let err = subscribe(&store, cmd, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { fields, .. } if fields.contains_key("email")));
    }
}
