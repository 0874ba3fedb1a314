/// 상품 종료 스케줄러
/// 마감 시각이 지난 상품의 활성 플래그를 내려 종료 상태를 저장한다.
/// 종료된 상품은 마감일을 늘려도 다시 열리지 않는다.
// region:    --- Imports
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Listing Scheduler
/// 상품 종료 스케줄러
pub struct ListingScheduler {
    store: Arc<dyn Store>,
    period: Duration,
}

impl ListingScheduler {
    pub fn new(store: Arc<dyn Store>, period: Duration) -> Self {
        Self { store, period }
    }

    /// 주기적 종료 처리 시작
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = interval(self.period);
            loop {
                interval.tick().await;
                if let Err(e) = self.sweep().await {
                    error!(
                        "{:<12} --> 상품 종료 처리 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        })
    }

    /// 한 번의 종료 처리; 종료된 상품 수 반환
    pub async fn sweep(&self) -> Result<u64, crate::error::AppError> {
        let closed = self.store.close_expired_listings(Utc::now()).await?;
        if closed > 0 {
            info!("{:<12} --> 상품 {}건 종료", "Scheduler", closed);
        } else {
            debug!("{:<12} --> 종료할 상품 없음", "Scheduler");
        }
        Ok(closed)
    }
}
// endregion: --- Listing Scheduler

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ListingStore, MemoryStore};
    use crate::testing::{seed_listing, seed_user};
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn sweep_persists_closed_state() {
        let store = Arc::new(MemoryStore::new());
        let past = Utc::now() - ChronoDuration::days(2);
        let owner = seed_user(store.as_ref(), "owner@email.com", past).await;
        let expired = seed_listing(store.as_ref(), &owner, "Vintage Clock", past).await;
        let open = seed_listing(store.as_ref(), &owner, "Brass Lamp", Utc::now()).await;

        let scheduler = ListingScheduler::new(store.clone(), Duration::from_secs(30));
        assert_eq!(scheduler.sweep().await.unwrap(), 1);
        assert_eq!(scheduler.sweep().await.unwrap(), 0);

        assert!(!store.find_listing(expired.id).await.unwrap().unwrap().active);
        assert!(store.find_listing(open.id).await.unwrap().unwrap().active);
    }
}
