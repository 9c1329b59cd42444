// region:    --- Imports
use super::{AuctionBatch, AuctionFilter, AuctionStore, BatchOutcome};
use crate::auction::model::{Auction, Category, Item, Manager, NewAuction};
use crate::database::DatabaseManager;
use crate::error::StoreError;
use crate::query::queries;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

// endregion: --- Imports

// region:    --- Postgres Store
/// PostgreSQL 경매 저장소
pub struct PgAuctionStore {
    db: Arc<DatabaseManager>,
}

impl PgAuctionStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, StoreError> {
        let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(auction)
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let item = sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(item)
    }

    async fn find_manager(&self, id: i64) -> Result<Option<Manager>, StoreError> {
        let manager = sqlx::query_as::<_, Manager>(queries::GET_MANAGER)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(manager)
    }

    async fn list_auctions(&self, filter: AuctionFilter) -> Result<Vec<Auction>, StoreError> {
        let auctions = sqlx::query_as::<_, Auction>(queries::LIST_AUCTIONS)
            .bind(filter.item_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(auctions)
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let items = sqlx::query_as::<_, Item>(queries::LIST_ITEMS)
            .fetch_all(self.db.pool())
            .await?;
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(queries::LIST_CATEGORIES)
            .fetch_all(self.db.pool())
            .await?;
        Ok(categories)
    }

    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let created = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
                        .bind(auction.item_id)
                        .bind(auction.kind)
                        .bind(auction.starting_price)
                        .bind(auction.start_date)
                        .bind(auction.end_date)
                        .bind(auction.manager_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok::<_, StoreError>(created)
                })
            })
            .await
    }

    async fn save_auctions(&self, batch: AuctionBatch) -> Result<BatchOutcome, StoreError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let mut outcome = BatchOutcome::default();

                    for change in batch.auctions {
                        let affected = sqlx::query(queries::UPDATE_AUCTION_STATUS)
                            .bind(change.status)
                            .bind(change.sold_value)
                            .bind(change.auction_id)
                            .bind(change.expected)
                            .execute(&mut **tx)
                            .await?
                            .rows_affected();
                        if affected == 0 {
                            debug!(
                                "{:<12} --> 경매 {} 상태가 이미 변경되어 건너뜀",
                                "PgStore", change.auction_id
                            );
                            outcome.stale += 1;
                        } else {
                            outcome.auctions_applied += 1;
                        }
                    }

                    for change in batch.items {
                        let affected = sqlx::query(queries::UPDATE_ITEM_STATUS)
                            .bind(change.status)
                            .bind(change.item_id)
                            .bind(change.expected)
                            .execute(&mut **tx)
                            .await?
                            .rows_affected();
                        if affected == 0 {
                            outcome.stale += 1;
                        } else {
                            outcome.items_applied += 1;
                        }
                    }

                    Ok::<_, StoreError>(outcome)
                })
            })
            .await
    }
}
// endregion: --- Postgres Store
