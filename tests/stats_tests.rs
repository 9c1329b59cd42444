mod common;

use auction_status_service::auction::model::AuctionStatus;
use auction_status_service::stats::{StatsAggregator, StatsSnapshot, NO_CATEGORIES};
use common::{at, sample_auction, Fixture};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn snapshot(fx: &Fixture) -> StatsSnapshot {
    StatsAggregator::new(fx.store.clone()).snapshot().await.unwrap()
}

/// 낙찰이 없으면 매출/수익 관련 값은 모두 0
#[tokio::test]
async fn test_sales_aggregates_are_zero_without_sold_auctions() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let item = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    fx.store
        .put_auction(sample_auction(100, item.id, fx.manager.id, dec!(100), Decimal::ZERO, AuctionStatus::Close))
        .await;
    fx.store
        .put_auction(sample_auction(101, item.id, fx.manager.id, dec!(100), Decimal::ZERO, AuctionStatus::Open))
        .await;

    let stats = snapshot(&fx).await;

    assert_eq!(stats.total_revenue(), Decimal::ZERO);
    assert_eq!(stats.average_sale_price(), Decimal::ZERO);
    assert_eq!(stats.total_profit(), Decimal::ZERO);
    assert_eq!(stats.average_profit(), Decimal::ZERO);
    assert_eq!(stats.highest_sale_price(), Decimal::ZERO);
    assert_eq!(stats.lowest_sale_price(), Decimal::ZERO);
    assert_eq!(stats.above_starting_price_rate(), 0.0);
    assert!(stats.highest_profit_auction().is_none());
}

/// 재계산 결과를 기준으로 한 집계
#[tokio::test]
async fn test_counts_after_reconciliation() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let item = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    fx.store
        .put_auction(sample_auction(100, item.id, fx.manager.id, dec!(100), dec!(150), AuctionStatus::Open))
        .await;
    fx.store
        .put_auction(sample_auction(101, item.id, fx.manager.id, dec!(100), Decimal::ZERO, AuctionStatus::Open))
        .await;
    let mut pending = sample_auction(102, item.id, fx.manager.id, dec!(100), Decimal::ZERO, AuctionStatus::Pending);
    pending.start_date = at(2024, 2, 1, 0);
    pending.end_date = at(2024, 2, 5, 0);
    fx.store.put_auction(pending).await;

    fx.reconciler().trigger().await.unwrap();
    let stats = snapshot(&fx).await;

    assert_eq!(stats.total_auctions(), 3);
    assert_eq!(stats.active_auctions(), 1);
    assert_eq!(stats.closed_auctions(), 1);
    assert_eq!(stats.sold_auctions(), 1);
    assert_eq!(stats.not_sold_auctions(), 1);
    assert_eq!(stats.total_revenue(), dec!(150));
    assert_eq!(stats.total_profit(), dec!(50));
    assert_eq!(stats.highest_profit_auction().map(|a| a.id), Some(100));

    let distribution = stats.status_distribution();
    assert_eq!(distribution.len(), 4);
    assert_eq!(distribution["Pending"], 1);
    assert_eq!(distribution["Open"], 0);
    assert_eq!(distribution["Close"], 1);
    assert_eq!(distribution["Sold"], 1);
}

#[tokio::test]
async fn test_sale_price_aggregates() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let item = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    for (id, starting, sold) in [(100, dec!(100), dec!(150)), (101, dec!(200), dec!(250)), (102, dec!(50), dec!(50))] {
        fx.store
            .put_auction(sample_auction(id, item.id, fx.manager.id, starting, sold, AuctionStatus::Sold))
            .await;
    }

    let stats = snapshot(&fx).await;

    assert_eq!(stats.total_revenue(), dec!(450));
    assert_eq!(stats.average_sale_price(), dec!(150));
    assert_eq!(stats.total_profit(), dec!(100));
    assert_eq!(stats.highest_sale_price(), dec!(250));
    assert_eq!(stats.lowest_sale_price(), dec!(50));
    // 동률이면 id가 작은 경매
    assert_eq!(stats.highest_profit_auction().map(|a| a.id), Some(100));
    let rate = stats.above_starting_price_rate();
    assert!((rate - 200.0 / 3.0).abs() < 1e-9);
}

/// 경매 수는 상품을 소유한 매니저 기준
#[tokio::test]
async fn test_auctions_by_manager_uses_item_owner() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let other = fx.store.add_manager("lee").await;
    let mine = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    let theirs = fx.store.add_item("desk", "https://a/desk", vec![], other.id).await;
    // 경매 등록자는 다르지만 상품 소유자는 other
    fx.store
        .put_auction(sample_auction(100, theirs.id, fx.manager.id, dec!(10), Decimal::ZERO, AuctionStatus::Open))
        .await;
    fx.store
        .put_auction(sample_auction(101, theirs.id, other.id, dec!(10), Decimal::ZERO, AuctionStatus::Open))
        .await;
    fx.store
        .put_auction(sample_auction(102, mine.id, fx.manager.id, dec!(10), Decimal::ZERO, AuctionStatus::Open))
        .await;

    let counts = snapshot(&fx).await.auctions_by_manager();

    assert_eq!(counts.get(&other.id), Some(&2));
    assert_eq!(counts.get(&fx.manager.id), Some(&1));
}

#[tokio::test]
async fn test_most_popular_category() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let a = fx.store.add_category("A").await;
    let b = fx.store.add_category("B").await;
    let _unused = fx.store.add_category("C").await;
    let in_a = fx.store.add_item("lamp", "https://a/lamp", vec![a.id], fx.manager.id).await;
    let in_both = fx.store.add_item("desk", "https://a/desk", vec![a.id, b.id], fx.manager.id).await;
    for (id, item_id) in [(100, in_a.id), (101, in_a.id), (102, in_both.id)] {
        fx.store
            .put_auction(sample_auction(id, item_id, fx.manager.id, dec!(10), Decimal::ZERO, AuctionStatus::Open))
            .await;
    }

    let stats = snapshot(&fx).await;

    assert_eq!(stats.most_popular_category(), "A");
    assert_eq!(stats.auctions_in_category(a.id), 3);
    assert_eq!(stats.auctions_in_category(b.id), 1);
    assert_eq!(stats.total_categories(), 3);
    let distribution = stats.category_distribution();
    assert_eq!(distribution.len(), 2);
    assert_eq!(distribution[&a.id], 3);
    assert_eq!(distribution[&b.id], 1);
}

#[tokio::test]
async fn test_most_popular_category_without_categories() {
    let fx = Fixture::new(at(2024, 1, 11, 8)).await;
    let _a = fx.store.add_category("A").await;
    let item = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    fx.store
        .put_auction(sample_auction(100, item.id, fx.manager.id, dec!(10), Decimal::ZERO, AuctionStatus::Open))
        .await;

    let stats = snapshot(&fx).await;

    assert_eq!(stats.most_popular_category(), NO_CATEGORIES);
    assert!(stats.category_distribution().is_empty());
}
