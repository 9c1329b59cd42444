// region:    --- Imports
use auction_status_service::clock::{Clock, SystemClock};
use auction_status_service::config::AppConfig;
use auction_status_service::database::DatabaseManager;
use auction_status_service::handlers::{self, AppState};
use auction_status_service::scheduler::{ReconciliationScheduler, Reconciler};
use auction_status_service::stats::StatsAggregator;
use auction_status_service::store::{AuctionStore, InMemoryAuctionStore, PgAuctionStore};
use axum::extract::DefaultBodyLimit;
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

    let config = AppConfig::from_env()?;
    info!(
        "{:<12} --> 설정 로드 (재계산 주기 {:?})",
        "Main", config.reconcile_interval
    );

    // 저장소 생성
    let store: Arc<dyn AuctionStore> = match &config.database_url {
        Some(url) => {
            let db_manager = Arc::new(
                DatabaseManager::new(url, config.database_max_connections)
                    .await
                    .map_err(|e| {
                        error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
                        e
                    })?,
            );
            if config.database_reset {
                db_manager.recreate_schema().await.map_err(|e| {
                    error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                    e
                })?;
                info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            }
            Arc::new(PgAuctionStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 미설정, 메모리 저장소로 실행합니다.",
                "Main"
            );
            Arc::new(InMemoryAuctionStore::new())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 경매 상태 재계산 스케줄러
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::clone(&clock));
    let scheduler = ReconciliationScheduler::start(reconciler.clone(), config.reconcile_interval);

    let state = AppState {
        store: Arc::clone(&store),
        clock,
        reconciler,
        stats: StatsAggregator::new(store),
    };
    let routes_all = handlers::router(state).layer(DefaultBodyLimit::max(1024 * 1024));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    // 진행 중인 재계산은 끝까지 실행한 뒤 종료
    scheduler.stop().await;
    info!("{:<12} --> 서비스 종료", "Main");
    Ok(())
}

/// Ctrl-C 또는 SIGTERM 수신 시 종료
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("{:<12} --> Ctrl-C 핸들러 등록 실패: {:?}", "Main", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!("{:<12} --> SIGTERM 핸들러 등록 실패: {:?}", "Main", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("{:<12} --> 종료 신호 수신", "Main");
}
// endregion: --- Main
