// region:    --- Imports
use rust_decimal::Decimal;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Store Error
/// 저장소 오류
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("데이터베이스 오류: {0}")]
    Database(sqlx::Error),

    /// 연결을 얻지 못한 경우. 다음 시도에서 회복될 수 있다.
    #[error("저장소를 사용할 수 없음: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}
// endregion: --- Store Error

// region:    --- Auction Error
/// 경매 도메인 오류
#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("잘못된 입력: {0}")]
    Validation(String),

    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    #[error("존재하지 않는 상품 id: {0}")]
    InvalidItem(i64),

    #[error("존재하지 않는 매니저 id: {0}")]
    InvalidManager(i64),

    #[error("시작일은 종료일보다 앞서야 합니다.")]
    InvalidDateRange,

    #[error("시작일은 과거일 수 없습니다.")]
    PastStartDate,

    #[error("잘못된 상태: {0}")]
    InvalidState(String),

    #[error("낙찰가 {sold_value}가 시작가 {starting_price}보다 낮습니다.")]
    InvalidValue {
        sold_value: Decimal,
        starting_price: Decimal,
    },

    #[error("저장소 오류: {0}")]
    Persistence(#[from] StoreError),

    #[error("서비스가 종료 중입니다.")]
    ShuttingDown,
}

impl AuctionError {
    /// 응답에 포함되는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation(_) => "VALIDATION",
            AuctionError::NotFound(_) => "NOT_FOUND",
            AuctionError::InvalidItem(_) => "INVALID_ITEM",
            AuctionError::InvalidManager(_) => "INVALID_MANAGER",
            AuctionError::InvalidDateRange => "INVALID_DATE_RANGE",
            AuctionError::PastStartDate => "PAST_START_DATE",
            AuctionError::InvalidState(_) => "INVALID_STATE",
            AuctionError::InvalidValue { .. } => "INVALID_VALUE",
            AuctionError::Persistence(_) => "PERSISTENCE",
            AuctionError::ShuttingDown => "SHUTTING_DOWN",
        }
    }
}
// endregion: --- Auction Error

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("환경 변수 {name} 값이 올바르지 않음: {value}")]
    InvalidValue { name: &'static str, value: String },
}
// endregion: --- Config Error

// endregion: --- Tests
