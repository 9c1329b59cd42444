/// 경매 상태 재계산
/// 이전 상태는 보지 않는다. 매번 날짜와 금액만으로 목표 상태를 새로 계산하므로
/// 몇 번을 실행해도, 주기를 놓친 뒤에 실행해도 같은 결과가 나온다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Item, ItemStatus};
use crate::store::{AuctionChange, ItemChange};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

// endregion: --- Imports

// region:    --- Status Rules
/// 낙찰 판정 규칙. 재계산과 낙찰 기록이 같은 규칙을 써야 서로 뒤집지 않는다.
pub fn meets_starting_price(sold_value: Decimal, starting_price: Decimal) -> bool {
    sold_value >= starting_price
}

/// 날짜 단위로 경매의 목표 상태를 계산
pub fn target_status(today: NaiveDate, auction: &Auction) -> AuctionStatus {
    let start = auction.start_date.date_naive();
    let end = auction.end_date.date_naive();

    if today < start {
        AuctionStatus::Pending
    } else if today <= end {
        AuctionStatus::Open
    } else if meets_starting_price(auction.sold_value, auction.starting_price) {
        AuctionStatus::Sold
    } else {
        AuctionStatus::Close
    }
}

/// 상품에 걸린 모든 경매 상태를 모아 상품 상태를 결정
/// 하나라도 Sold 이면 Sold, 아니면 Available
pub fn reduce_item_status<I>(statuses: I) -> ItemStatus
where
    I: IntoIterator<Item = AuctionStatus>,
{
    if statuses.into_iter().any(|s| s == AuctionStatus::Sold) {
        ItemStatus::Sold
    } else {
        ItemStatus::Available
    }
}
// endregion: --- Status Rules

// region:    --- Reconciliation Plan
/// 상품 하나에 대한 변경 묶음. 저장 단위이자 실패 격리 단위다.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPlan {
    pub item_id: i64,
    pub auctions: Vec<AuctionChange>,
    pub item: Option<ItemChange>,
}

impl ItemPlan {
    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty() && self.item.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan {
    pub today: NaiveDate,
    pub auctions_scanned: usize,
    pub groups: Vec<ItemPlan>,
}

/// 스냅샷 전체에 대한 변경 계획 수립
/// 경매를 상품별로 먼저 묶고, 상품 상태는 묶음의 목표 상태들로 한 번만 결정한다.
pub fn plan_reconciliation(today: NaiveDate, auctions: &[Auction], items: &[Item]) -> ReconciliationPlan {
    let mut by_item: BTreeMap<i64, Vec<&Auction>> = BTreeMap::new();
    for auction in auctions {
        by_item.entry(auction.item_id).or_default().push(auction);
    }
    let item_status: BTreeMap<i64, ItemStatus> =
        items.iter().map(|item| (item.id, item.status)).collect();

    let mut item_ids: Vec<i64> = by_item.keys().copied().collect();
    item_ids.extend(item_status.keys().copied().filter(|id| !by_item.contains_key(id)));
    item_ids.sort_unstable();

    let mut groups = Vec::new();
    for item_id in item_ids {
        let group = by_item.get(&item_id).map(Vec::as_slice).unwrap_or_default();

        let mut changes = Vec::new();
        let mut targets = Vec::with_capacity(group.len());
        for auction in group {
            let target = target_status(today, auction);
            targets.push(target);
            if target != auction.status {
                changes.push(AuctionChange::status(auction.id, auction.status, target));
            }
        }

        // 목록에 없는 상품(삭제 등)은 경매 상태만 맞춘다
        let item = item_status.get(&item_id).and_then(|&current| {
            let reduced = reduce_item_status(targets);
            (reduced != current).then(|| ItemChange {
                item_id,
                expected: current,
                status: reduced,
            })
        });

        let plan = ItemPlan {
            item_id,
            auctions: changes,
            item,
        };
        if !plan.is_empty() {
            groups.push(plan);
        }
    }

    ReconciliationPlan {
        today,
        auctions_scanned: auctions.len(),
        groups,
    }
}
// endregion: --- Reconciliation Plan

// endregion: --- Tests
