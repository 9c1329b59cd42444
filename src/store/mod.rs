// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Category, Item, ItemStatus, Manager, NewAuction};
use crate::error::StoreError;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuctionStore;
pub use postgres::PgAuctionStore;

// endregion: --- Imports

// region:    --- Changes
/// 경매 한 건의 상태 변경
/// `expected` 는 읽었을 때의 상태이며, 저장 시점에 상태가 달라져 있으면 적용하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionChange {
    pub auction_id: i64,
    pub expected: AuctionStatus,
    pub status: AuctionStatus,
    pub sold_value: Option<Decimal>,
}

impl AuctionChange {
    pub fn status(auction_id: i64, expected: AuctionStatus, status: AuctionStatus) -> Self {
        Self {
            auction_id,
            expected,
            status,
            sold_value: None,
        }
    }
}

/// 상품 한 건의 상태 변경
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange {
    pub item_id: i64,
    pub expected: ItemStatus,
    pub status: ItemStatus,
}

/// 한 번의 저장 호출로 원자적으로 반영되는 변경 묶음
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuctionBatch {
    pub auctions: Vec<AuctionChange>,
    pub items: Vec<ItemChange>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub auctions_applied: usize,
    pub items_applied: usize,
    /// 기대 상태가 맞지 않아 건너뛴 행 수
    pub stale: usize,
}

/// 경매 조회 조건
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuctionFilter {
    pub item_id: Option<i64>,
}

impl AuctionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_item(item_id: i64) -> Self {
        Self {
            item_id: Some(item_id),
        }
    }

    pub fn matches(&self, auction: &Auction) -> bool {
        self.item_id.map_or(true, |id| auction.item_id == id)
    }
}
// endregion: --- Changes

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, StoreError>;

    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError>;

    async fn find_manager(&self, id: i64) -> Result<Option<Manager>, StoreError>;

    /// id 오름차순
    async fn list_auctions(&self, filter: AuctionFilter) -> Result<Vec<Auction>, StoreError>;

    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Pending 상태, 낙찰가 0 으로 새 경매 저장
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError>;

    /// 호출 단위로 원자적
    async fn save_auctions(&self, batch: AuctionBatch) -> Result<BatchOutcome, StoreError>;
}
// endregion: --- Auction Store Trait
