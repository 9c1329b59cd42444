#![allow(dead_code)]

use auction_status_service::auction::model::{Auction, AuctionKind, AuctionStatus, Manager};
use auction_status_service::clock::FixedClock;
use auction_status_service::scheduler::Reconciler;
use auction_status_service::store::InMemoryAuctionStore;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// UTC 시각
pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// 2024-01-01 09시 시작, 2024-01-10 18시 종료 경매
pub fn sample_auction(
    id: i64,
    item_id: i64,
    manager_id: i64,
    starting_price: Decimal,
    sold_value: Decimal,
    status: AuctionStatus,
) -> Auction {
    Auction {
        id,
        item_id,
        kind: AuctionKind::OpenAuction,
        starting_price,
        start_date: at(2024, 1, 1, 9),
        end_date: at(2024, 1, 10, 18),
        status,
        sold_value,
        manager_id,
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryAuctionStore>,
    pub clock: Arc<FixedClock>,
    pub manager: Manager,
}

impl Fixture {
    pub async fn new(now: DateTime<Utc>) -> Self {
        let store = Arc::new(InMemoryAuctionStore::new());
        let manager = store.add_manager("kim").await;
        Self {
            store,
            clock: Arc::new(FixedClock::new(now)),
            manager,
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.store.clone(), self.clock.clone())
    }
}
