// region:    --- Imports
use crate::auction::commands::{self, RecordSaleCommand};
use crate::auction::model::NewAuction;
use crate::clock::Clock;
use crate::error::{AuctionError, StoreError};
use crate::scheduler::Reconciler;
use crate::stats::{StatsAggregator, StatsSnapshot};
use crate::store::AuctionStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuctionStore>,
    pub clock: Arc<dyn Clock>,
    pub reconciler: Reconciler,
    pub stats: StatsAggregator,
}

/// 라우터 설정
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auctions", post(handle_create_auction))
        .route("/auctions/update-status", post(handle_update_status))
        .route("/auctions/:id/sale", post(handle_record_sale))
        .route("/stats/auctions/total", get(handle_total_auctions))
        .route("/stats/auctions/active", get(handle_active_auctions))
        .route("/stats/auctions/closed", get(handle_closed_auctions))
        .route("/stats/auctions/sold", get(handle_sold_auctions))
        .route("/stats/auctions/not-sold", get(handle_not_sold_auctions))
        .route(
            "/stats/auctions/status-distribution",
            get(handle_status_distribution),
        )
        .route(
            "/stats/auctions/auctions-by-manager",
            get(handle_auctions_by_manager),
        )
        .route("/stats/main/total-revenue", get(handle_total_revenue))
        .route("/stats/main/average-sale-price", get(handle_average_sale_price))
        .route("/stats/main/total-profit", get(handle_total_profit))
        .route("/stats/main/average-profit", get(handle_average_profit))
        .route(
            "/stats/main/highest-profit-auction",
            get(handle_highest_profit_auction),
        )
        .route("/stats/main/highest-sale-price", get(handle_highest_sale_price))
        .route("/stats/main/lowest-sale-price", get(handle_lowest_sale_price))
        .route(
            "/stats/main/above-starting-price-rate",
            get(handle_above_starting_price_rate),
        )
        .route(
            "/stats/categories/total-categories",
            get(handle_total_categories),
        )
        .route(
            "/stats/categories/most-popular-category",
            get(handle_most_popular_category),
        )
        .route(
            "/stats/categories/auction-distribution",
            get(handle_category_distribution),
        )
        .route(
            "/stats/categories/auctions/:category_id",
            get(handle_auctions_in_category),
        )
        .layer(cors)
        .with_state(state)
}
// endregion: --- App State

// region:    --- Error Response
impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuctionError::Validation(_)
            | AuctionError::InvalidItem(_)
            | AuctionError::InvalidManager(_)
            | AuctionError::InvalidDateRange
            | AuctionError::PastStartDate
            | AuctionError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            AuctionError::NotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::InvalidState(_) => StatusCode::CONFLICT,
            AuctionError::Persistence(StoreError::Unavailable(_)) | AuctionError::ShuttingDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AuctionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {:?}", "Handler", self);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
// endregion: --- Error Response

// region:    --- Command Handlers

/// 경매 생성
pub async fn handle_create_auction(
    State(state): State<AppState>,
    Json(cmd): Json<NewAuction>,
) -> Response {
    match commands::create_auction(state.store.as_ref(), state.clock.as_ref(), cmd).await {
        Ok(auction) => (StatusCode::CREATED, Json(auction)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 낙찰 기록
pub async fn handle_record_sale(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(cmd): Json<RecordSaleCommand>,
) -> Response {
    match commands::record_sale(
        state.store.as_ref(),
        state.clock.as_ref(),
        auction_id,
        cmd.sold_value,
    )
    .await
    {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 경매 상태 즉시 재계산. 진행 중인 재계산이 있으면 끝날 때까지 기다린다.
pub async fn handle_update_status(State(state): State<AppState>) -> Response {
    info!("{:<12} --> 경매 상태 재계산 요청", "Command");
    match state.reconciler.trigger().await {
        Ok(report) if report.is_complete() => Json(report).into_response(),
        Ok(report) => (StatusCode::INTERNAL_SERVER_ERROR, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Command Handlers

// region:    --- Stats Handlers

async fn with_snapshot<T, F>(state: &AppState, name: &str, f: F) -> Response
where
    T: Serialize,
    F: FnOnce(&StatsSnapshot) -> T,
{
    info!("{:<12} --> 통계 조회: {}", "HandlerStats", name);
    match state.stats.snapshot().await {
        Ok(snapshot) => Json(f(&snapshot)).into_response(),
        Err(e) => AuctionError::from(e).into_response(),
    }
}

pub async fn handle_total_auctions(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "total", StatsSnapshot::total_auctions).await
}

pub async fn handle_active_auctions(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "active", StatsSnapshot::active_auctions).await
}

pub async fn handle_closed_auctions(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "closed", StatsSnapshot::closed_auctions).await
}

pub async fn handle_sold_auctions(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "sold", StatsSnapshot::sold_auctions).await
}

pub async fn handle_not_sold_auctions(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "not-sold", StatsSnapshot::not_sold_auctions).await
}

pub async fn handle_status_distribution(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "status-distribution", StatsSnapshot::status_distribution).await
}

pub async fn handle_auctions_by_manager(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "auctions-by-manager", StatsSnapshot::auctions_by_manager).await
}

pub async fn handle_total_revenue(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "total-revenue", StatsSnapshot::total_revenue).await
}

pub async fn handle_average_sale_price(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "average-sale-price", StatsSnapshot::average_sale_price).await
}

pub async fn handle_total_profit(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "total-profit", StatsSnapshot::total_profit).await
}

pub async fn handle_average_profit(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "average-profit", StatsSnapshot::average_profit).await
}

/// 낙찰 경매가 없으면 null
pub async fn handle_highest_profit_auction(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "highest-profit-auction", |s| {
        s.highest_profit_auction().cloned()
    })
    .await
}

pub async fn handle_highest_sale_price(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "highest-sale-price", StatsSnapshot::highest_sale_price).await
}

pub async fn handle_lowest_sale_price(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "lowest-sale-price", StatsSnapshot::lowest_sale_price).await
}

pub async fn handle_above_starting_price_rate(State(state): State<AppState>) -> Response {
    with_snapshot(
        &state,
        "above-starting-price-rate",
        StatsSnapshot::above_starting_price_rate,
    )
    .await
}

pub async fn handle_total_categories(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "total-categories", StatsSnapshot::total_categories).await
}

pub async fn handle_most_popular_category(State(state): State<AppState>) -> Response {
    with_snapshot(
        &state,
        "most-popular-category",
        StatsSnapshot::most_popular_category,
    )
    .await
}

pub async fn handle_category_distribution(State(state): State<AppState>) -> Response {
    with_snapshot(
        &state,
        "auction-distribution",
        StatsSnapshot::category_distribution,
    )
    .await
}

pub async fn handle_auctions_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Response {
    with_snapshot(&state, "auctions-in-category", |s| {
        s.auctions_in_category(category_id)
    })
    .await
}

// endregion: --- Stats Handlers

// endregion: --- Tests
