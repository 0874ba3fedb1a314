// region:    --- Imports
use bidout_auction::config::Config;
use bidout_auction::database::seed::seed_initial_data;
use bidout_auction::database::DatabaseManager;
use bidout_auction::mailer::SmtpMailer;
use bidout_auction::routes;
use bidout_auction::scheduler::ListingScheduler;
use bidout_auction::state::AppState;
use bidout_auction::store::{MemoryStore, PgStore, Store};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // 저장소 선택 (DATABASE_URL이 없으면 인메모리)
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let db_manager = Arc::new(DatabaseManager::connect(url).await?);
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(PgStore::new(db_manager))
        }
        None => {
            warn!("{:<12} --> DATABASE_URL 없음: 인메모리 저장소 사용", "Main");
            Arc::new(MemoryStore::new())
        }
    };

    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let sweep_interval = config.close_sweep_interval;
    let server_addr = config.server_addr.clone();
    let state = AppState::new(config, Arc::clone(&store), mailer);

    // 기본 카테고리 및 테스트 계정
    seed_initial_data(state.store.as_ref(), &state.passwords).await?;
    info!("{:<12} --> 초기 데이터 준비 완료", "Main");

    // 마감 상품 정리
    ListingScheduler::new(store, sweep_interval).start();

    let listener = TcpListener::bind(&server_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes::router(state).into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
