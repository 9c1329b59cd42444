/// 경매 통계
/// 저장된 현재 상태를 그대로 읽어서 계산한다. 재계산을 직접 일으키지 않으며 쓰기도 하지 않는다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Category, Item};
use crate::error::StoreError;
use crate::store::{AuctionFilter, AuctionStore};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

// endregion: --- Imports

/// 카테고리가 하나도 집계되지 않았을 때 반환하는 값
pub const NO_CATEGORIES: &str = "No categories available";

/// 집계된 카테고리 id에 해당하는 행이 없을 때 반환하는 값
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

// region:    --- Stats Aggregator
/// 통계 조회기
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn AuctionStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self { store }
    }

    /// 현재 저장소 스냅샷 조회
    pub async fn snapshot(&self) -> Result<StatsSnapshot, StoreError> {
        let auctions = self.store.list_auctions(AuctionFilter::all()).await?;
        let items = self.store.list_items().await?;
        let categories = self.store.list_categories().await?;
        debug!(
            "{:<12} --> 스냅샷 조회: 경매 {}건, 상품 {}건, 카테고리 {}건",
            "Stats",
            auctions.len(),
            items.len(),
            categories.len()
        );
        Ok(StatsSnapshot::new(auctions, items, categories))
    }
}
// endregion: --- Stats Aggregator

// region:    --- Stats Snapshot
/// 통계 계산용 스냅샷
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    auctions: Vec<Auction>,
    items: HashMap<i64, Item>,
    categories: Vec<Category>,
}

impl StatsSnapshot {
    pub fn new(mut auctions: Vec<Auction>, items: Vec<Item>, categories: Vec<Category>) -> Self {
        auctions.sort_by_key(|a| a.id);
        Self {
            auctions,
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            categories,
        }
    }

    fn count_where(&self, pred: impl Fn(&Auction) -> bool) -> usize {
        self.auctions.iter().filter(|&a| pred(a)).count()
    }

    fn sold(&self) -> impl Iterator<Item = &Auction> + '_ {
        self.auctions
            .iter()
            .filter(|a| a.status == AuctionStatus::Sold)
    }

    // region:    --- Auction Counts
    pub fn total_auctions(&self) -> usize {
        self.auctions.len()
    }

    /// Pending 또는 Open
    pub fn active_auctions(&self) -> usize {
        self.count_where(|a| matches!(a.status, AuctionStatus::Pending | AuctionStatus::Open))
    }

    pub fn closed_auctions(&self) -> usize {
        self.count_where(|a| a.status == AuctionStatus::Close)
    }

    pub fn sold_auctions(&self) -> usize {
        self.count_where(|a| a.status == AuctionStatus::Sold)
    }

    /// Close 상태이면서 낙찰가가 시작가에 못 미친 경매.
    /// Close 는 항상 이 조건을 만족하므로 closed_auctions 와 같은 값이 나온다.
    pub fn not_sold_auctions(&self) -> usize {
        self.count_where(|a| a.status == AuctionStatus::Close && a.sold_value < a.starting_price)
    }

    /// 모든 상태 라벨을 포함 (없는 상태는 0)
    pub fn status_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution: BTreeMap<String, usize> = AuctionStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for auction in &self.auctions {
            *distribution.entry(auction.status.to_string()).or_default() += 1;
        }
        distribution
    }

    /// 상품 소유 매니저 기준 경매 수
    pub fn auctions_by_manager(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for auction in &self.auctions {
            if let Some(item) = self.items.get(&auction.item_id) {
                *counts.entry(item.manager_id).or_default() += 1;
            }
        }
        counts
    }
    // endregion: --- Auction Counts

    // region:    --- Sales
    pub fn total_revenue(&self) -> Decimal {
        self.sold().map(|a| a.sold_value).sum()
    }

    pub fn average_sale_price(&self) -> Decimal {
        mean(self.sold().map(|a| a.sold_value))
    }

    pub fn total_profit(&self) -> Decimal {
        self.sold().map(Auction::profit).sum()
    }

    pub fn average_profit(&self) -> Decimal {
        mean(self.sold().map(Auction::profit))
    }

    /// 수익이 가장 큰 낙찰 경매. 동률이면 id가 가장 작은 경매
    pub fn highest_profit_auction(&self) -> Option<&Auction> {
        self.sold().fold(None, |best: Option<&Auction>, a| match best {
            Some(b) if b.profit() >= a.profit() => Some(b),
            _ => Some(a),
        })
    }

    pub fn highest_sale_price(&self) -> Decimal {
        self.sold().map(|a| a.sold_value).max().unwrap_or(Decimal::ZERO)
    }

    pub fn lowest_sale_price(&self) -> Decimal {
        self.sold().map(|a| a.sold_value).min().unwrap_or(Decimal::ZERO)
    }

    /// 시작가보다 비싸게 낙찰된 비율 (%)
    pub fn above_starting_price_rate(&self) -> f64 {
        let sold = self.sold_auctions();
        if sold == 0 {
            return 0.0;
        }
        let above = self.count_where(|a| {
            a.status == AuctionStatus::Sold && a.sold_value > a.starting_price
        });
        above as f64 / sold as f64 * 100.0
    }
    // endregion: --- Sales

    // region:    --- Categories
    pub fn total_categories(&self) -> usize {
        self.categories.len()
    }

    /// (경매, 카테고리) 쌍의 카테고리별 개수
    pub fn category_distribution(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for auction in &self.auctions {
            if let Some(item) = self.items.get(&auction.item_id) {
                for category_id in &item.category_ids {
                    *counts.entry(*category_id).or_default() += 1;
                }
            }
        }
        counts
    }

    pub fn auctions_in_category(&self, category_id: i64) -> usize {
        self.category_distribution()
            .get(&category_id)
            .copied()
            .unwrap_or(0)
    }

    /// 경매가 가장 많이 걸린 카테고리 이름. 동률이면 id가 가장 작은 카테고리
    pub fn most_popular_category(&self) -> String {
        let top = self
            .category_distribution()
            .into_iter()
            .fold(None, |best: Option<(i64, usize)>, (id, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((id, count)),
            });

        match top {
            None => NO_CATEGORIES.to_string(),
            Some((id, _)) => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        }
    }
    // endregion: --- Categories
}

fn mean(values: impl Iterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values.fold((Decimal::ZERO, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}
// endregion: --- Stats Snapshot
