use crate::error::{AppError, AppResult};
use crate::item::model::Item;
use crate::user::model::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Booking Model

/// 예약 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(raw: &str) -> Option<BookingStatus> {
        match raw {
            "WAITING" => Some(BookingStatus::Waiting),
            "APPROVED" => Some(BookingStatus::Approved),
            "REJECTED" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }
}

/// 목록 조회용 상태 필터. CURRENT는 기간이 아니라 APPROVED 상태를 뜻한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// 쿼리 파라미터 파싱. 대소문자를 가리지 않고, 없으면 ALL이다.
    pub fn parse(raw: Option<&str>) -> AppResult<BookingState> {
        let Some(raw) = raw else {
            return Ok(BookingState::All);
        };
        match raw.to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(AppError::BadRequest(format!("Unknown state: {raw}"))),
        }
    }
}

// 예약 모델. 물품과 예약자를 그대로 내장해서 내려준다.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: Item,
    pub booker: User,
    pub status: BookingStatus,
}

/// 예약 생성 요청
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub item_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// endregion: --- Booking Model

// region:    --- Tests


// endregion: --- Tests
