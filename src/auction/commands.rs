/// 경매 관련 커맨드 처리
/// 1. 경매 생성
/// 2. 낙찰 기록
// region:    --- Imports
use crate::auction::model::{fits_money_column, Auction, AuctionStatus, NewAuction};
use crate::auction::status::{meets_starting_price, reduce_item_status};
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::store::{AuctionBatch, AuctionChange, AuctionFilter, AuctionStore, ItemChange};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 낙찰 기록 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaleCommand {
    pub sold_value: Decimal,
}

// 동시 변경으로 저장이 밀렸을 때 최대 재시도 횟수
const MAX_RETRIES: u32 = 5;

/// 1. 경매 생성
pub async fn create_auction(
    store: &dyn AuctionStore,
    clock: &dyn Clock,
    cmd: NewAuction,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 생성 요청: {:?}", "Command", cmd);

    if cmd.item_id <= 0 {
        return Err(AuctionError::Validation(format!(
            "상품 id는 양수여야 합니다: {}",
            cmd.item_id
        )));
    }
    if cmd.manager_id <= 0 {
        return Err(AuctionError::Validation(format!(
            "매니저 id는 양수여야 합니다: {}",
            cmd.manager_id
        )));
    }
    if cmd.starting_price <= Decimal::ZERO {
        return Err(AuctionError::Validation(format!(
            "시작가는 0보다 커야 합니다: {}",
            cmd.starting_price
        )));
    }
    if !fits_money_column(cmd.starting_price) {
        return Err(AuctionError::Validation(format!(
            "시작가가 허용 범위를 벗어났습니다: {}",
            cmd.starting_price
        )));
    }

    if store.find_item(cmd.item_id).await?.is_none() {
        return Err(AuctionError::InvalidItem(cmd.item_id));
    }
    if cmd.start_date < clock.now() {
        return Err(AuctionError::PastStartDate);
    }
    if cmd.start_date >= cmd.end_date {
        return Err(AuctionError::InvalidDateRange);
    }
    if store.find_manager(cmd.manager_id).await?.is_none() {
        return Err(AuctionError::InvalidManager(cmd.manager_id));
    }

    let auction = store.insert_auction(cmd).await?;
    info!(
        "{:<12} --> 경매 {} 생성 (상품 {}, 상태 {})",
        "Command", auction.id, auction.item_id, auction.status
    );
    Ok(auction)
}

/// 2. 낙찰 기록
/// 종료된 경매에만 기록할 수 있고, 낙찰가는 시작가 이상이어야 한다.
/// 상품 상태는 같은 상품의 모든 경매를 모아 다시 결정한다.
pub async fn record_sale(
    store: &dyn AuctionStore,
    clock: &dyn Clock,
    auction_id: i64,
    sold_value: Decimal,
) -> Result<Auction, AuctionError> {
    info!(
        "{:<12} --> 낙찰 기록 요청: 경매 {}, 낙찰가 {}",
        "Command", auction_id, sold_value
    );
    if auction_id <= 0 {
        return Err(AuctionError::Validation(format!(
            "경매 id는 양수여야 합니다: {}",
            auction_id
        )));
    }
    if !fits_money_column(sold_value) {
        return Err(AuctionError::Validation(format!(
            "낙찰가가 허용 범위를 벗어났습니다: {}",
            sold_value
        )));
    }

    let mut retries = 0;
    loop {
        let auction = store
            .find_auction(auction_id)
            .await?
            .ok_or_else(|| AuctionError::NotFound(format!("경매 {}", auction_id)))?;

        // 종료 시각이 지났고, 날짜 단위 재계산에서도 종료일이 지난 경우에만 허용
        let now = clock.now();
        if now <= auction.end_date || now.date_naive() <= auction.end_date.date_naive() {
            return Err(AuctionError::InvalidState(format!(
                "경매 {}는 아직 종료되지 않았습니다 (종료일 {})",
                auction.id, auction.end_date
            )));
        }
        if !meets_starting_price(sold_value, auction.starting_price) {
            return Err(AuctionError::InvalidValue {
                sold_value,
                starting_price: auction.starting_price,
            });
        }

        let siblings = store
            .list_auctions(AuctionFilter::by_item(auction.item_id))
            .await?;
        let reduced = reduce_item_status(siblings.iter().map(|a| {
            if a.id == auction.id {
                AuctionStatus::Sold
            } else {
                a.status
            }
        }));

        let mut batch = AuctionBatch {
            auctions: vec![AuctionChange {
                auction_id: auction.id,
                expected: auction.status,
                status: AuctionStatus::Sold,
                sold_value: Some(sold_value),
            }],
            items: Vec::new(),
        };
        if let Some(item) = store.find_item(auction.item_id).await? {
            if item.status != reduced {
                batch.items.push(ItemChange {
                    item_id: item.id,
                    expected: item.status,
                    status: reduced,
                });
            }
        }

        let item_changes = batch.items.len();
        let outcome = store.save_auctions(batch).await?;
        if outcome.auctions_applied == 1 {
            if outcome.items_applied < item_changes {
                sync_item_status(store, auction.item_id).await?;
            }
            info!(
                "{:<12} --> 경매 {} 낙찰 처리 완료 (낙찰가 {}, 상품 {} 상태 {})",
                "Command", auction.id, sold_value, auction.item_id, reduced
            );
            return Ok(Auction {
                status: AuctionStatus::Sold,
                sold_value,
                ..auction
            });
        }

        retries += 1;
        if retries >= MAX_RETRIES {
            return Err(AuctionError::InvalidState(format!(
                "경매 {} 상태가 계속 변경되어 낙찰을 기록하지 못했습니다",
                auction_id
            )));
        }
        warn!(
            "{:<12} --> 경매 {} 상태가 동시에 변경됨, 재시도 {}/{}",
            "Command", auction_id, retries, MAX_RETRIES
        );
    }
}

/// 상품 상태만 다시 계산해서 저장. 낙찰 저장 후 상품 변경이 밀렸을 때 사용한다.
async fn sync_item_status(store: &dyn AuctionStore, item_id: i64) -> Result<(), AuctionError> {
    for attempt in 1..=MAX_RETRIES {
        let Some(item) = store.find_item(item_id).await? else {
            return Ok(());
        };
        let siblings = store.list_auctions(AuctionFilter::by_item(item_id)).await?;
        let reduced = reduce_item_status(siblings.iter().map(|a| a.status));
        if item.status == reduced {
            return Ok(());
        }

        let batch = AuctionBatch {
            auctions: Vec::new(),
            items: vec![ItemChange {
                item_id,
                expected: item.status,
                status: reduced,
            }],
        };
        if store.save_auctions(batch).await?.items_applied == 1 {
            return Ok(());
        }
        warn!(
            "{:<12} --> 상품 {} 상태가 동시에 변경됨, 재시도 {}/{}",
            "Command", item_id, attempt, MAX_RETRIES
        );
    }

    // 낙찰 자체는 저장됨. 상품 상태는 다음 재계산에서 맞춰진다.
    warn!(
        "{:<12} --> 상품 {} 상태 동기화 포기, 다음 재계산에 맡김",
        "Command", item_id
    );
    Ok(())
}
// endregion: --- Commands
