/// 메모리 기반 경매 저장소
/// DATABASE_URL 없이 실행할 때와 테스트에서 사용한다.
// region:    --- Imports
use super::{AuctionBatch, AuctionFilter, AuctionStore, BatchOutcome};
use crate::auction::model::{
    Auction, AuctionStatus, Category, Item, ItemStatus, Manager, NewAuction,
};
use crate::error::StoreError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

// endregion: --- Imports

// region:    --- In-Memory Store
#[derive(Debug, Default)]
struct Tables {
    auctions: BTreeMap<i64, Auction>,
    items: BTreeMap<i64, Item>,
    categories: BTreeMap<i64, Category>,
    managers: BTreeMap<i64, Manager>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    tables: RwLock<Tables>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 매니저 등록
    pub async fn add_manager(&self, name: &str) -> Manager {
        let mut tables = self.tables.write().await;
        let manager = Manager {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.managers.insert(manager.id, manager.clone());
        manager
    }

    /// 카테고리 등록
    pub async fn add_category(&self, name: &str) -> Category {
        let mut tables = self.tables.write().await;
        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        category
    }

    /// 상품 등록. 상태는 Available 로 시작한다.
    pub async fn add_item(
        &self,
        name: &str,
        url: &str,
        category_ids: Vec<i64>,
        manager_id: i64,
    ) -> Item {
        let mut tables = self.tables.write().await;
        let item = Item {
            id: tables.next_id(),
            name: name.to_string(),
            url: url.to_string(),
            description: None,
            category_ids,
            manager_id,
            status: ItemStatus::Available,
        };
        tables.items.insert(item.id, item.clone());
        item
    }

    /// 경매 레코드를 그대로 저장 (데이터 이관, 테스트 픽스처용)
    pub async fn put_auction(&self, auction: Auction) {
        let mut tables = self.tables.write().await;
        tables.next_id = tables.next_id.max(auction.id);
        tables.auctions.insert(auction.id, auction);
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, StoreError> {
        Ok(self.tables.read().await.auctions.get(&id).cloned())
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn find_manager(&self, id: i64) -> Result<Option<Manager>, StoreError> {
        Ok(self.tables.read().await.managers.get(&id).cloned())
    }

    async fn list_auctions(&self, filter: AuctionFilter) -> Result<Vec<Auction>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .auctions
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.tables.read().await.items.values().cloned().collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        let mut tables = self.tables.write().await;
        let auction = Auction {
            id: tables.next_id(),
            item_id: auction.item_id,
            kind: auction.kind,
            starting_price: auction.starting_price,
            start_date: auction.start_date,
            end_date: auction.end_date,
            status: AuctionStatus::Pending,
            sold_value: Decimal::ZERO,
            manager_id: auction.manager_id,
        };
        tables.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    async fn save_auctions(&self, batch: AuctionBatch) -> Result<BatchOutcome, StoreError> {
        // 쓰기 잠금 하나로 묶음 전체를 반영
        let mut tables = self.tables.write().await;
        let mut outcome = BatchOutcome::default();

        for change in batch.auctions {
            match tables.auctions.get_mut(&change.auction_id) {
                Some(auction) if auction.status == change.expected => {
                    auction.status = change.status;
                    if let Some(sold_value) = change.sold_value {
                        auction.sold_value = sold_value;
                    }
                    outcome.auctions_applied += 1;
                }
                _ => outcome.stale += 1,
            }
        }

        for change in batch.items {
            match tables.items.get_mut(&change.item_id) {
                Some(item) if item.status == change.expected => {
                    item.status = change.status;
                    outcome.items_applied += 1;
                }
                _ => outcome.stale += 1,
            }
        }

        Ok(outcome)
    }
}
// endregion: --- In-Memory Store
