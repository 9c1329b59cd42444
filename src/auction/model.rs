use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// 경매 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auction_kind")]
pub enum AuctionKind {
    OpenAuction,
    SealedBid,
}

// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auction_status")]
pub enum AuctionStatus {
    Pending,
    Open,
    Close,
    Sold,
}

impl AuctionStatus {
    pub const ALL: [AuctionStatus; 4] = [
        AuctionStatus::Pending,
        AuctionStatus::Open,
        AuctionStatus::Close,
        AuctionStatus::Sold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Pending => "Pending",
            AuctionStatus::Open => "Open",
            AuctionStatus::Close => "Close",
            AuctionStatus::Sold => "Sold",
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_status")]
pub enum ItemStatus {
    Available,
    Sold,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Available => f.write_str("Available"),
            ItemStatus::Sold => f.write_str("Sold"),
        }
    }
}

// 경매 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub item_id: i64,
    pub kind: AuctionKind,
    pub starting_price: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: AuctionStatus,
    pub sold_value: Decimal,
    pub manager_id: i64,
}

impl Auction {
    /// 판매 수익 (낙찰가 - 시작가)
    pub fn profit(&self) -> Decimal {
        self.sold_value - self.starting_price
    }
}

/// 금액 컬럼(NUMERIC(18,2))에 그대로 들어가는 값인지 확인.
/// 정수부 16자리, 소수점 이하 2자리까지.
pub fn fits_money_column(value: Decimal) -> bool {
    value.abs() < Decimal::from(10_i64.pow(16)) && value.normalize().scale() <= 2
}

// 상품 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub category_ids: Vec<i64>,
    pub manager_id: i64,
    pub status: ItemStatus,
}

// 카테고리 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// 매니저 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Manager {
    pub id: i64,
    pub name: String,
}

/// 경매 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuction {
    pub item_id: i64,
    pub kind: AuctionKind,
    pub starting_price: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub manager_id: i64,
}
