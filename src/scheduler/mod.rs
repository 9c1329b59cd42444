/// 경매 상태 재계산 스케줄러
/// 정해진 주기마다, 또는 요청이 있을 때 전체 경매 상태를 다시 계산한다.
/// 재계산은 한 번에 하나만 실행된다. 동시에 들어온 요청은 앞선 재계산이 끝날 때까지 기다린다.
// region:    --- Imports
use crate::auction::status::plan_reconciliation;
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::store::{AuctionBatch, AuctionFilter, AuctionStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Reconciliation Report
/// 상품 단위 저장 실패
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    pub item_id: i64,
    pub reason: String,
}

/// 재계산 1회 결과
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub today: NaiveDate,
    pub auctions_scanned: usize,
    pub auctions_updated: usize,
    pub items_updated: usize,
    pub stale_skipped: usize,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconciliationReport {
    fn new(today: NaiveDate, auctions_scanned: usize) -> Self {
        Self {
            today,
            auctions_scanned,
            auctions_updated: 0,
            items_updated: 0,
            stale_skipped: 0,
            failures: Vec::new(),
        }
    }

    /// 실패한 상품이 없으면 true
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
// endregion: --- Reconciliation Report

// region:    --- Reconciler
/// 재계산 실행기
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn AuctionStore>,
    clock: Arc<dyn Clock>,
    // 허가 1개짜리 세마포어. 재계산 간 상호 배제
    pass_guard: Arc<Semaphore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn AuctionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            pass_guard: Arc::new(Semaphore::new(1)),
        }
    }

    /// 재계산 실행. 다른 재계산이 진행 중이면 끝날 때까지 기다린다.
    pub async fn trigger(&self) -> Result<ReconciliationReport, AuctionError> {
        let _permit = self
            .pass_guard
            .acquire()
            .await
            .map_err(|_| AuctionError::ShuttingDown)?;
        self.run_pass().await
    }

    /// 이후의 재계산 요청을 거부. 진행 중인 재계산은 끝까지 실행된다.
    pub fn close(&self) {
        self.pass_guard.close();
    }

    async fn run_pass(&self) -> Result<ReconciliationReport, AuctionError> {
        let today = self.clock.now().date_naive();
        info!("{:<12} --> 경매 상태 재계산 시작 (기준일 {})", "Reconcile", today);

        let auctions = self.store.list_auctions(AuctionFilter::all()).await?;
        let items = self.store.list_items().await?;
        let plan = plan_reconciliation(today, &auctions, &items);

        let mut report = ReconciliationReport::new(today, plan.auctions_scanned);
        for group in plan.groups {
            for change in &group.auctions {
                debug!(
                    "{:<12} --> 경매 {} 상태 변경: {} -> {}",
                    "Reconcile", change.auction_id, change.expected, change.status
                );
            }
            if let Some(change) = &group.item {
                debug!(
                    "{:<12} --> 상품 {} 상태 변경: {} -> {}",
                    "Reconcile", change.item_id, change.expected, change.status
                );
            }

            let item_id = group.item_id;
            let batch = AuctionBatch {
                auctions: group.auctions,
                items: group.item.into_iter().collect(),
            };
            match self.store.save_auctions(batch).await {
                Ok(outcome) => {
                    report.auctions_updated += outcome.auctions_applied;
                    report.items_updated += outcome.items_applied;
                    report.stale_skipped += outcome.stale;
                }
                Err(e) => {
                    error!(
                        "{:<12} --> 상품 {} 상태 저장 실패, 건너뜀: {:?}",
                        "Reconcile", item_id, e
                    );
                    report.failures.push(ReconcileFailure {
                        item_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "{:<12} --> 재계산 완료: 경매 {}건 조회, 경매 {}건/상품 {}건 변경, 건너뜀 {}건, 실패 {}건",
            "Reconcile",
            report.auctions_scanned,
            report.auctions_updated,
            report.items_updated,
            report.stale_skipped,
            report.failures.len()
        );
        Ok(report)
    }
}
// endregion: --- Reconciler

// region:    --- Reconciliation Scheduler
/// 주기 재계산 작업. 서비스 최상위에서 생성하고 종료 시 `stop` 으로 정리한다.
pub struct ReconciliationScheduler {
    reconciler: Reconciler,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReconciliationScheduler {
    /// 스케줄러 시작. 첫 재계산은 즉시 실행된다.
    pub fn start(reconciler: Reconciler, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let worker = reconciler.clone();
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            info!("{:<12} --> 스케줄러 시작 (주기 {:?})", "Scheduler", period);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // 종료 신호는 재계산 사이에서만 확인한다
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                match worker.trigger().await {
                    Ok(report) if report.is_complete() => {
                        debug!("{:<12} --> 주기 재계산 성공", "Scheduler");
                    }
                    Ok(report) => {
                        warn!(
                            "{:<12} --> 주기 재계산 일부 실패: {}건",
                            "Scheduler",
                            report.failures.len()
                        );
                    }
                    Err(AuctionError::ShuttingDown) => break,
                    Err(e) => {
                        error!(
                            "{:<12} --> 경매 상태 재계산 중 오류 발생: {:?}",
                            "Scheduler", e
                        );
                    }
                }
            }
            info!("{:<12} --> 스케줄러 종료", "Scheduler");
        });

        Self {
            reconciler,
            shutdown_tx,
            handle,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// 스케줄러 종료. 진행 중인 재계산이 있으면 끝난 뒤에 반환한다.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        self.reconciler.close();
        if let Err(e) = self.handle.await {
            error!("{:<12} --> 스케줄러 작업 종료 오류: {:?}", "Scheduler", e);
        }
    }
}
// endregion: --- Reconciliation Scheduler
