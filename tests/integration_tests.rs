mod common;

use auction_status_service::auction::model::{AuctionStatus, ItemStatus};
use auction_status_service::handlers::{self, AppState};
use auction_status_service::stats::StatsAggregator;
use auction_status_service::store::AuctionStore;
use common::{at, Fixture};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// 임시 포트로 서버 실행 후 주소 반환
async fn spawn_server(fx: &Fixture) -> String {
    let state = AppState {
        store: fx.store.clone(),
        clock: fx.clock.clone(),
        reconciler: fx.reconciler(),
        stats: StatsAggregator::new(fx.store.clone()),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, handlers::router(state).into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

/// 경매 생성부터 낙찰, 통계까지
#[tokio::test]
async fn test_auction_lifecycle_over_http() {
    let fx = Fixture::new(at(2024, 1, 1, 0)).await;
    let category = fx.store.add_category("furniture").await;
    let item = fx
        .store
        .add_item("chair", "https://a/chair", vec![category.id], fx.manager.id)
        .await;
    let base = spawn_server(&fx).await;
    let client = Client::new();

    // 경매 생성
    let response = client
        .post(format!("{}/auctions", base))
        .json(&json!({
            "item_id": item.id,
            "kind": "OpenAuction",
            "starting_price": 100,
            "start_date": "2024-01-02T09:00:00Z",
            "end_date": "2024-01-10T18:00:00Z",
            "manager_id": fx.manager.id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["status"], "Pending");
    let auction_id = created["id"].as_i64().unwrap();

    // 종료 전 낙찰 기록은 거부
    let response = client
        .post(format!("{}/auctions/{}/sale", base, auction_id))
        .json(&json!({ "sold_value": 150 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_STATE");

    // 진행 중
    fx.clock.set(at(2024, 1, 5, 12));
    let response = client
        .post(format!("{}/auctions/update-status", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["auctions_updated"], 1);
    assert_eq!(
        fx.store.find_auction(auction_id).await.unwrap().unwrap().status,
        AuctionStatus::Open
    );

    // 종료 후 낙찰
    fx.clock.set(at(2024, 1, 11, 12));
    let response = client
        .post(format!("{}/auctions/{}/sale", base, auction_id))
        .json(&json!({ "sold_value": 150 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sold: Value = response.json().await.unwrap();
    assert_eq!(sold["status"], "Sold");
    assert_eq!(
        fx.store.find_item(item.id).await.unwrap().unwrap().status,
        ItemStatus::Sold
    );

    let profit: Value = client
        .get(format!("{}/stats/main/total-profit", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // 금액은 정밀도 손실 없이 문자열로 직렬화
    assert_eq!(profit, "50");

    let popular: Value = client
        .get(format!("{}/stats/categories/most-popular-category", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(popular, "furniture");

    let sold_count: Value = client
        .get(format!("{}/stats/auctions/sold", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sold_count, 1);
}

#[tokio::test]
async fn test_error_responses_carry_codes() {
    let fx = Fixture::new(at(2024, 1, 1, 0)).await;
    let item = fx.store.add_item("lamp", "https://a/lamp", vec![], fx.manager.id).await;
    let base = spawn_server(&fx).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/auctions/{}/sale", base, 9_999))
        .json(&json!({ "sold_value": 150 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");

    let response = client
        .post(format!("{}/auctions", base))
        .json(&json!({
            "item_id": item.id,
            "kind": "SealedBid",
            "starting_price": 100,
            "start_date": "2023-12-01T00:00:00Z",
            "end_date": "2024-01-10T18:00:00Z",
            "manager_id": fx.manager.id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "PAST_START_DATE");
}

#[tokio::test]
async fn test_empty_stats_over_http() {
    let fx = Fixture::new(at(2024, 1, 1, 0)).await;
    let base = spawn_server(&fx).await;
    let client = Client::new();

    let highest: Value = client
        .get(format!("{}/stats/main/highest-profit-auction", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(highest.is_null());

    let popular: Value = client
        .get(format!("{}/stats/categories/most-popular-category", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(popular, "No categories available");

    let distribution: Value = client
        .get(format!("{}/stats/auctions/status-distribution", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        distribution,
        json!({ "Pending": 0, "Open": 0, "Close": 0, "Sold": 0 })
    );
}
